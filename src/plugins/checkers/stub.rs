use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::models::{AvailabilityResult, Product, Vendor};
use crate::plugins::traits::AvailabilityChecker;

/// Scripted checker for pipeline and web tests. Reports stock for the
/// listed product identifiers, optionally only at one postal code, and
/// records every call it receives.
pub(crate) struct StubChecker {
    vendor: Vendor,
    scoped: bool,
    in_stock: Vec<String>,
    only_at: Option<String>,
    calls: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl StubChecker {
    pub(crate) fn new(vendor: Vendor, scoped: bool) -> Self {
        Self {
            vendor,
            scoped,
            in_stock: Vec::new(),
            only_at: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn in_stock(mut self, identifier: &str) -> Self {
        self.in_stock.push(identifier.to_string());
        self
    }

    pub(crate) fn only_at(mut self, postal_code: &str) -> Self {
        self.only_at = Some(postal_code.to_string());
        self
    }

    /// `(product identifier, location)` for every call, in order.
    pub(crate) fn calls(&self) -> Arc<Mutex<Vec<(String, Option<String>)>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl AvailabilityChecker for StubChecker {
    fn vendor(&self) -> Vendor {
        self.vendor.clone()
    }

    fn location_scoped(&self) -> bool {
        self.scoped
    }

    async fn check(&self, product: &Product, location: Option<&str>) -> Option<AvailabilityResult> {
        self.calls
            .lock()
            .unwrap()
            .push((product.product_identifier.clone(), location.map(str::to_string)));

        if !self.in_stock.contains(&product.product_identifier) {
            return None;
        }
        if let Some(only_at) = &self.only_at {
            if location != Some(only_at.as_str()) {
                return None;
            }
        }

        Some(
            AvailabilityResult::in_stock(self.vendor.clone(), product, location)
                .with_message(format!("✅ *In Stock at {}*\n[{}]({})", self.vendor, product.name, product.link())),
        )
    }
}
