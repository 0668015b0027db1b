// Vendor availability checker implementations
pub mod amazon;
pub mod croma;
pub mod disabled;
pub mod flipkart;
pub mod sigv4;

#[cfg(test)]
pub(crate) mod stub;

pub use amazon::AmazonChecker;
pub use croma::CromaChecker;
pub use disabled::DisabledChecker;
pub use flipkart::FlipkartChecker;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::models::{Product, Vendor};
use crate::plugins::notifiers::telegram::escape_markdown;
use crate::utils::error::AppError;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Failure talking to a vendor or reading its answer.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// Reads a JSON body, turning non-2xx statuses into `CheckError::Status`.
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CheckError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(CheckError::Status {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    Ok(serde_json::from_str(&body)?)
}

/// Alert block shared by all vendors: a heading plus the product as a link.
pub(crate) fn alert_block(vendor: &Vendor, location: Option<&str>, product: &Product) -> String {
    let heading = match location {
        Some(code) => format!("✅ *In Stock at {} ({})*", vendor, code),
        None => format!("✅ *In Stock at {}*", vendor),
    };
    format!("{}\n[{}]({})", heading, escape_markdown(&product.name), product.link())
}

pub(crate) fn log_failure(vendor: &Vendor, product: &Product, location: Option<&str>, source: CheckError) {
    let error = AppError::VendorCheck {
        vendor: vendor.tag().to_string(),
        source,
    };
    warn!(
        vendor = %vendor,
        product = %product.name,
        postal_code = location.unwrap_or("-"),
        error = %error,
        "Availability check failed, treating as not available"
    );
}
