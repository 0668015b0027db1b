use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::sigv4::{sign_request, RequestTarget, SigningCredentials};
use super::{alert_block, log_failure, read_json, CheckError};
use crate::config::AmazonConfig;
use crate::models::{AvailabilityResult, Product, Vendor};
use crate::plugins::traits::AvailabilityChecker;
use crate::{AppError, Result};

const SERVICE: &str = "ProductAdvertisingAPI";
const GET_ITEMS_TARGET: &str = "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.GetItems";
const STOCK_KEYWORD: &str = "stock";

/// Amazon Product Advertising API 5 `GetItems`. Availability is national,
/// so the checker ignores delivery locations.
pub struct AmazonChecker {
    client: Client,
    endpoint: String,
    host: String,
    path: String,
    credentials: SigningCredentials,
    partner_tag: String,
    marketplace: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetItemsRequest<'a> {
    item_ids: [&'a str; 1],
    resources: [&'static str; 3],
    partner_tag: &'a str,
    partner_type: &'static str,
    marketplace: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct GetItemsResponse {
    items_result: Option<ItemsResult>,
    errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ItemsResult {
    items: Vec<Item>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Item {
    item_info: Option<ItemInfo>,
    offers: Option<Offers>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ItemInfo {
    title: Option<DisplayValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct DisplayValue {
    display_value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Offers {
    listings: Vec<Listing>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Listing {
    price: Option<Price>,
    availability: Option<Availability>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Price {
    display_amount: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Availability {
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ApiErrorEntry {
    code: Option<String>,
    message: Option<String>,
}

/// Positive when the availability message mentions stock, in any case.
pub fn message_indicates_stock(message: &str) -> bool {
    message.to_lowercase().contains(STOCK_KEYWORD)
}

impl AmazonChecker {
    pub fn new(config: &AmazonConfig) -> Result<Self> {
        let url = Url::parse(&config.endpoint)
            .map_err(|e| AppError::Validation(format!("Invalid Amazon endpoint: {}", e)))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(AppError::Validation("Amazon endpoint has no host".to_string()));
            }
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            host,
            path: url.path().to_string(),
            credentials: SigningCredentials {
                access_key: config.access_key.clone(),
                secret_key: config.secret_key.clone(),
                region: config.region.clone(),
                service: SERVICE.to_string(),
            },
            partner_tag: config.partner_tag.clone(),
            marketplace: config.marketplace.clone(),
        })
    }

    fn payload(&self, asin: &str) -> std::result::Result<String, CheckError> {
        let request = GetItemsRequest {
            item_ids: [asin],
            resources: [
                "ItemInfo.Title",
                "Offers.Listings.Price",
                "Offers.Listings.Availability.Message",
            ],
            partner_tag: &self.partner_tag,
            partner_type: "Associates",
            marketplace: &self.marketplace,
        };
        Ok(serde_json::to_string(&request)?)
    }

    async fn fetch(&self, product: &Product) -> std::result::Result<Option<AvailabilityResult>, CheckError> {
        // The signature covers these exact bytes, so they are sent as-is
        let payload = self.payload(&product.product_identifier)?;
        let target = RequestTarget {
            host: &self.host,
            path: &self.path,
            amz_target: GET_ITEMS_TARGET,
        };
        let signed = sign_request(&self.credentials, &target, Utc::now(), &payload)?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("accept", "application/json, text/javascript");
        for (name, value) in signed.headers() {
            request = request.header(name, value);
        }

        let response = request.body(payload).send().await?;
        let body: GetItemsResponse = read_json(response).await?;

        let Some(items) = body.items_result else {
            let codes: Vec<String> = body
                .errors
                .iter()
                .map(|e| {
                    format!(
                        "{}: {}",
                        e.code.as_deref().unwrap_or("Unknown"),
                        e.message.as_deref().unwrap_or("")
                    )
                })
                .collect();
            return Err(CheckError::Unexpected(format!(
                "no ItemsResult in response ({})",
                codes.join("; ")
            )));
        };

        let item = items
            .items
            .into_iter()
            .next()
            .ok_or_else(|| CheckError::Unexpected("ItemsResult has no items".to_string()))?;

        if let Some(title) = item.item_info.as_ref().and_then(|info| info.title.as_ref()) {
            debug!(asin = %product.product_identifier, title = %title.display_value, "Amazon item resolved");
        }

        let listing = item.offers.and_then(|offers| offers.listings.into_iter().next());
        let Some(listing) = listing else {
            debug!(product = %product.name, "Amazon item has no offer listings");
            return Ok(None);
        };

        let availability = listing
            .availability
            .and_then(|a| a.message)
            .unwrap_or_default();
        if !message_indicates_stock(&availability) {
            debug!(product = %product.name, availability = %availability, "Amazon item not in stock");
            return Ok(None);
        }

        let price = listing.price.and_then(|p| p.display_amount);
        let message = format!("{}\n📦 {}", alert_block(&Vendor::Amazon, None, product), availability);

        Ok(Some(
            AvailabilityResult::in_stock(Vendor::Amazon, product, None)
                .with_price(price)
                .with_message(message),
        ))
    }
}

#[async_trait]
impl AvailabilityChecker for AmazonChecker {
    fn vendor(&self) -> Vendor {
        Vendor::Amazon
    }

    fn location_scoped(&self) -> bool {
        false
    }

    async fn check(&self, product: &Product, _location: Option<&str>) -> Option<AvailabilityResult> {
        match self.fetch(product).await {
            Ok(result) => result,
            Err(e) => {
                log_failure(&Vendor::Amazon, product, None, e);
                None
            }
        }
    }
}
