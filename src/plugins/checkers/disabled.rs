use async_trait::async_trait;
use tracing::debug;

use crate::models::{AvailabilityResult, Product, Vendor};
use crate::plugins::traits::AvailabilityChecker;

/// Stand-in for a vendor switched off in configuration, typically while its
/// API is throttling us. Always reports "not available".
pub struct DisabledChecker {
    vendor: Vendor,
}

impl DisabledChecker {
    pub fn new(vendor: Vendor) -> Self {
        Self { vendor }
    }
}

#[async_trait]
impl AvailabilityChecker for DisabledChecker {
    fn vendor(&self) -> Vendor {
        self.vendor.clone()
    }

    fn location_scoped(&self) -> bool {
        false
    }

    async fn check(&self, product: &Product, _location: Option<&str>) -> Option<AvailabilityResult> {
        debug!(vendor = %self.vendor, product = %product.name, "Vendor disabled, skipping check");
        None
    }
}
