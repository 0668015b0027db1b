use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::{alert_block, log_failure, read_json, CheckError};
use crate::config::FlipkartConfig;
use crate::models::{AvailabilityResult, Product, Vendor};
use crate::plugins::traits::AvailabilityChecker;
use crate::Result;

const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 6.0; Nexus 5 Build/MRA58N) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/137.0.0.0 Mobile Safari/537.36";

/// Flipkart product serviceability API.
pub struct FlipkartChecker {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ServiceabilityResponse {
    #[serde(rename = "RESPONSE", default)]
    response: HashMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListingEntry {
    listing_summary: Option<ListingSummary>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListingSummary {
    serviceable: bool,
    available: bool,
}

impl FlipkartChecker {
    pub fn new(config: &FlipkartConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    async fn fetch(
        &self,
        product: &Product,
        postal_code: &str,
    ) -> std::result::Result<Option<AvailabilityResult>, CheckError> {
        let body = json!({
            "requestContext": { "products": [{ "productId": product.product_identifier }] },
            "locationContext": { "pincode": postal_code }
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("accept", "application/json")
            .header("origin", "https://www.flipkart.com")
            .header("referer", "https://www.flipkart.com/")
            .header("user-agent", MOBILE_USER_AGENT)
            .header(
                "x-user-agent",
                format!("{} FKUA/msite/0.0.3/msite/Mobile", MOBILE_USER_AGENT),
            )
            .json(&body)
            .send()
            .await?;

        let parsed: ServiceabilityResponse = read_json(response).await?;

        let entry = parsed
            .response
            .get(&product.product_identifier)
            .ok_or_else(|| {
                CheckError::Unexpected(format!(
                    "no serviceability entry for {}",
                    product.product_identifier
                ))
            })?;
        let entry: ListingEntry = serde_json::from_value(entry.clone())?;
        let summary = entry.listing_summary.unwrap_or_default();

        if !(summary.serviceable && summary.available) {
            debug!(
                product = %product.name,
                postal_code,
                serviceable = summary.serviceable,
                available = summary.available,
                "Flipkart listing not deliverable"
            );
            return Ok(None);
        }

        Ok(Some(
            AvailabilityResult::in_stock(Vendor::Flipkart, product, Some(postal_code))
                .with_message(alert_block(&Vendor::Flipkart, Some(postal_code), product)),
        ))
    }
}

#[async_trait]
impl AvailabilityChecker for FlipkartChecker {
    fn vendor(&self) -> Vendor {
        Vendor::Flipkart
    }

    fn location_scoped(&self) -> bool {
        true
    }

    async fn check(&self, product: &Product, location: Option<&str>) -> Option<AvailabilityResult> {
        let postal_code = location?;

        match self.fetch(product, postal_code).await {
            Ok(result) => result,
            Err(e) => {
                log_failure(&Vendor::Flipkart, product, location, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProduct;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_product() -> Product {
        Product::new(NewProduct {
            name: "Nothing Phone 3a".to_string(),
            url: "https://www.flipkart.com/nothing-phone-3a/p/itm123?pid=MOBH8G3PZ".to_string(),
            product_identifier: "MOBH8G3PZ".to_string(),
            vendor: Vendor::Flipkart,
            affiliate_link: None,
        })
    }

    fn checker(server: &MockServer) -> FlipkartChecker {
        FlipkartChecker::new(&FlipkartConfig {
            enabled: true,
            endpoint: format!("{}/api/3/product/serviceability", server.uri()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    async fn mount(server: &MockServer, body: Value) {
        Mock::given(method("POST"))
            .and(path("/api/3/product/serviceability"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_serviceable_and_available() {
        let server = MockServer::start().await;
        mount(
            &server,
            json!({ "RESPONSE": { "MOBH8G3PZ": { "listingSummary": { "serviceable": true, "available": true } } } }),
        )
        .await;

        let result = checker(&server).check(&test_product(), Some("110016")).await.unwrap();
        assert_eq!(result.vendor, Vendor::Flipkart);
        assert_eq!(result.location.as_deref(), Some("110016"));
        assert!(result.message.unwrap().contains("In Stock at Flipkart (110016)"));
    }

    #[tokio::test]
    async fn test_not_serviceable() {
        let server = MockServer::start().await;
        mount(
            &server,
            json!({ "RESPONSE": { "MOBH8G3PZ": { "listingSummary": { "serviceable": false, "available": true } } } }),
        )
        .await;

        assert!(checker(&server).check(&test_product(), Some("110016")).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_entry() {
        let server = MockServer::start().await;
        mount(&server, json!({ "RESPONSE": {} })).await;

        assert!(checker(&server).check(&test_product(), Some("110016")).await.is_none());
    }

    #[tokio::test]
    async fn test_without_location_makes_no_request() {
        let server = MockServer::start().await;
        mount(&server, json!({ "RESPONSE": {} })).await;

        assert!(checker(&server).check(&test_product(), None).await.is_none());
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
