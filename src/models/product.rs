use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{generate_id, Vendor};

/// A tracked catalog entry. Loaded fresh at the start of every run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Vendor item id: Croma item code, Amazon ASIN, Flipkart pid, ...
    pub product_identifier: String,
    pub vendor: Vendor,
    pub affiliate_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub url: String,
    pub product_identifier: String,
    pub vendor: Vendor,
    pub affiliate_link: Option<String>,
}

#[derive(Debug, FromRow)]
pub(crate) struct ProductRow {
    pub id: String,
    pub name: String,
    pub url: String,
    pub product_identifier: String,
    pub vendor_tag: String,
    pub affiliate_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(new_product: NewProduct) -> Self {
        Self {
            id: generate_id(),
            name: new_product.name,
            url: new_product.url,
            product_identifier: new_product.product_identifier,
            vendor: new_product.vendor,
            affiliate_link: new_product
                .affiliate_link
                .filter(|link| !link.trim().is_empty()),
            created_at: Utc::now(),
        }
    }

    /// Link shown in alerts: the affiliate link when there is one.
    pub fn link(&self) -> &str {
        match self.affiliate_link.as_deref() {
            Some(link) if !link.trim().is_empty() => link,
            _ => &self.url,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            url: row.url,
            product_identifier: row.product_identifier,
            vendor: Vendor::from_tag(&row.vendor_tag),
            affiliate_link: row.affiliate_link,
            created_at: row.created_at,
        }
    }
}
