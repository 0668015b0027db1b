use serde::{Deserialize, Serialize};

use crate::models::{Product, Vendor};

/// Verdict from one vendor check. Only positive verdicts leave a checker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityResult {
    pub vendor: Vendor,
    pub product_id: String,
    pub product_name: String,
    pub link: String,
    pub location: Option<String>,
    pub available: bool,
    pub price: Option<String>,
    /// Markdown block naming the product and its link, ready for the alert.
    pub message: Option<String>,
}

impl AvailabilityResult {
    pub fn in_stock(vendor: Vendor, product: &Product, location: Option<&str>) -> Self {
        Self {
            vendor,
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            link: product.link().to_string(),
            location: location.map(str::to_string),
            available: true,
            price: None,
            message: None,
        }
    }

    pub fn with_price(mut self, price: Option<String>) -> Self {
        self.price = price.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VendorTally {
    pub checked: usize,
    pub available: usize,
}

/// Outcome of one run. Discarded once the alert has been sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub tallies: Vec<(Vendor, VendorTally)>,
    pub results: Vec<AvailabilityResult>,
    /// Catalog rows whose vendor has no checker.
    pub skipped: usize,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            tallies: Vendor::SUPPORTED
                .iter()
                .map(|vendor| (vendor.clone(), VendorTally::default()))
                .collect(),
            results: Vec::new(),
            skipped: 0,
        }
    }

    pub fn record_checked(&mut self, vendor: &Vendor) {
        self.tally_mut(vendor).checked += 1;
    }

    pub fn record_available(&mut self, result: AvailabilityResult) {
        self.tally_mut(&result.vendor).available += 1;
        self.results.push(result);
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn tally(&self, vendor: &Vendor) -> Option<VendorTally> {
        self.tallies
            .iter()
            .find(|(v, _)| v == vendor)
            .map(|(_, tally)| *tally)
    }

    pub fn found(&self) -> usize {
        self.results.len()
    }

    pub fn total_checked(&self) -> usize {
        self.tallies.iter().map(|(_, tally)| tally.checked).sum()
    }

    fn tally_mut(&mut self, vendor: &Vendor) -> &mut VendorTally {
        if let Some(index) = self.tallies.iter().position(|(v, _)| v == vendor) {
            return &mut self.tallies[index].1;
        }
        self.tallies.push((vendor.clone(), VendorTally::default()));
        let last = self.tallies.len() - 1;
        &mut self.tallies[last].1
    }
}
