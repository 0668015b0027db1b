use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod availability;
pub mod product;

// Re-exports for convenience
pub use availability::*;
pub use product::*;

/// Retailer a catalog row is tracked at. Tags without a checker are kept
/// as `Unsupported` so the rows survive and are skipped during runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Vendor {
    Croma,
    Amazon,
    Flipkart,
    Unsupported(String),
}

impl Vendor {
    /// Vendors with a checker, in the order summaries report them.
    pub const SUPPORTED: [Vendor; 3] = [Vendor::Croma, Vendor::Amazon, Vendor::Flipkart];

    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "croma" => Vendor::Croma,
            "amazon" => Vendor::Amazon,
            "flipkart" => Vendor::Flipkart,
            other => Vendor::Unsupported(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Vendor::Croma => "croma",
            Vendor::Amazon => "amazon",
            Vendor::Flipkart => "flipkart",
            Vendor::Unsupported(tag) => tag,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Vendor::Croma => "Croma",
            Vendor::Amazon => "Amazon",
            Vendor::Flipkart => "Flipkart",
            Vendor::Unsupported(tag) => tag,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Vendor::Unsupported(_))
    }
}

impl From<String> for Vendor {
    fn from(tag: String) -> Self {
        Vendor::from_tag(&tag)
    }
}

impl From<Vendor> for String {
    fn from(vendor: Vendor) -> Self {
        vendor.tag().to_string()
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// Helper function to generate ids in the format stored by the catalog
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}
