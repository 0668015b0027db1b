use async_trait::async_trait;

use crate::models::{AvailabilityResult, Product, Vendor};

/// Per-vendor availability adapter.
///
/// `check` never fails: transport, status and decoding problems are logged
/// by the implementation and reported as `None`, the same as "not available".
#[async_trait]
pub trait AvailabilityChecker: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// Whether the verdict depends on the delivery postal code. Checkers
    /// that return `false` are called once per product with no location.
    fn location_scoped(&self) -> bool;

    async fn check(&self, product: &Product, location: Option<&str>) -> Option<AvailabilityResult>;
}
