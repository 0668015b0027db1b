use tracing::info;

use super::checkers::{AmazonChecker, CromaChecker, DisabledChecker, FlipkartChecker};
use super::traits::AvailabilityChecker;
use crate::config::VendorsConfig;
use crate::models::Vendor;
use crate::Result;

pub type CheckerBox = Box<dyn AvailabilityChecker>;

/// One checker per supported vendor. Lookup is a plain match on the vendor
/// tag so an unknown tag can never reach a checker.
pub struct CheckerSet {
    croma: CheckerBox,
    amazon: CheckerBox,
    flipkart: CheckerBox,
}

impl CheckerSet {
    pub fn new(croma: CheckerBox, amazon: CheckerBox, flipkart: CheckerBox) -> Self {
        Self {
            croma,
            amazon,
            flipkart,
        }
    }

    /// Build the real checkers, swapping in a no-op for each disabled vendor.
    pub fn from_config(config: &VendorsConfig) -> Result<Self> {
        let croma: CheckerBox = if config.croma.enabled {
            Box::new(CromaChecker::new(&config.croma)?)
        } else {
            Box::new(DisabledChecker::new(Vendor::Croma))
        };

        let amazon: CheckerBox = if config.amazon.enabled {
            Box::new(AmazonChecker::new(&config.amazon)?)
        } else {
            Box::new(DisabledChecker::new(Vendor::Amazon))
        };

        let flipkart: CheckerBox = if config.flipkart.enabled {
            Box::new(FlipkartChecker::new(&config.flipkart)?)
        } else {
            Box::new(DisabledChecker::new(Vendor::Flipkart))
        };

        info!(
            croma = config.croma.enabled,
            amazon = config.amazon.enabled,
            flipkart = config.flipkart.enabled,
            "Vendor checkers ready"
        );

        Ok(Self::new(croma, amazon, flipkart))
    }

    pub fn for_vendor(&self, vendor: &Vendor) -> Option<&dyn AvailabilityChecker> {
        match vendor {
            Vendor::Croma => Some(self.croma.as_ref()),
            Vendor::Amazon => Some(self.amazon.as_ref()),
            Vendor::Flipkart => Some(self.flipkart.as_ref()),
            Vendor::Unsupported(_) => None,
        }
    }
}
