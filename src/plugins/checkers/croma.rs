use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{alert_block, log_failure, read_json, CheckError};
use crate::config::CromaConfig;
use crate::models::{AvailabilityResult, Product, Vendor};
use crate::plugins::traits::AvailabilityChecker;
use crate::Result;

/// Croma delivery-promise API. A product counts as available only when the
/// promise assigns it a concrete delivery date for the postal code.
pub struct CromaChecker {
    client: Client,
    endpoint: String,
    subscription_key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PromiseEnvelope {
    promise: Option<Promise>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Promise {
    suggested_option: Option<SuggestedOption>,
    unavailable_lines: Option<UnavailableLines>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SuggestedOption {
    option: Option<PromiseOption>,
    unavailable_lines: Option<UnavailableLines>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PromiseOption {
    promise_lines: Option<PromiseLines>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PromiseLines {
    promise_line: Vec<PromiseLine>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PromiseLine {
    assignments: Option<Assignments>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Assignments {
    assignment: Vec<Assignment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Assignment {
    delivery_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UnavailableLines {
    unavailable_line: Vec<Value>,
}

impl UnavailableLines {
    fn has_entries(lines: &Option<UnavailableLines>) -> bool {
        lines.as_ref().is_some_and(|l| !l.unavailable_line.is_empty())
    }
}

impl CromaChecker {
    pub fn new(config: &CromaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            subscription_key: config.subscription_key.clone(),
        })
    }

    fn request_body(product: &Product, postal_code: &str) -> Value {
        json!({
            "promise": {
                "allocationRuleID": "SYSTEM",
                "checkInventory": "Y",
                "organizationCode": "CROMA",
                "sourcingClassification": "EC",
                "promiseLines": {
                    "promiseLine": [{
                        "fulfillmentType": "HDEL",
                        "itemID": product.product_identifier,
                        "lineId": "1",
                        "requiredQty": "1",
                        "shipToAddress": { "zipCode": postal_code },
                        "extn": { "widerStoreFlag": "N" }
                    }]
                }
            }
        })
    }

    /// Earliest delivery date promised for the line, if any. An explicit
    /// unavailable line overrides whatever else the response carries.
    fn delivery_date(envelope: &PromiseEnvelope) -> std::result::Result<Option<String>, CheckError> {
        let promise = envelope
            .promise
            .as_ref()
            .ok_or_else(|| CheckError::Unexpected("response has no promise object".to_string()))?;

        if UnavailableLines::has_entries(&promise.unavailable_lines) {
            return Ok(None);
        }

        let Some(suggested) = promise.suggested_option.as_ref() else {
            return Ok(None);
        };

        if UnavailableLines::has_entries(&suggested.unavailable_lines) {
            return Ok(None);
        }

        let date = suggested
            .option
            .iter()
            .filter_map(|option| option.promise_lines.as_ref())
            .flat_map(|lines| lines.promise_line.iter())
            .filter_map(|line| line.assignments.as_ref())
            .flat_map(|assignments| assignments.assignment.iter())
            .filter_map(|assignment| assignment.delivery_date.as_deref())
            .map(str::trim)
            .filter(|date| !date.is_empty())
            .min()
            .map(str::to_string);

        Ok(date)
    }

    async fn fetch(
        &self,
        product: &Product,
        postal_code: &str,
    ) -> std::result::Result<Option<AvailabilityResult>, CheckError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("accept", "application/json")
            .header("oms-apim-subscription-key", &self.subscription_key)
            .header("origin", "https://www.croma.com")
            .header("referer", "https://www.croma.com/")
            .json(&Self::request_body(product, postal_code))
            .send()
            .await?;

        let envelope: PromiseEnvelope = read_json(response).await?;

        let Some(date) = Self::delivery_date(&envelope)? else {
            debug!(product = %product.name, postal_code, "Croma has no delivery promise");
            return Ok(None);
        };

        let message = format!(
            "{}\n🚚 Delivery by {}",
            alert_block(&Vendor::Croma, Some(postal_code), product),
            date
        );

        Ok(Some(
            AvailabilityResult::in_stock(Vendor::Croma, product, Some(postal_code)).with_message(message),
        ))
    }
}

#[async_trait]
impl AvailabilityChecker for CromaChecker {
    fn vendor(&self) -> Vendor {
        Vendor::Croma
    }

    fn location_scoped(&self) -> bool {
        true
    }

    async fn check(&self, product: &Product, location: Option<&str>) -> Option<AvailabilityResult> {
        let Some(postal_code) = location else {
            debug!(product = %product.name, "Croma check needs a postal code, skipping");
            return None;
        };

        match self.fetch(product, postal_code).await {
            Ok(result) => result,
            Err(e) => {
                log_failure(&Vendor::Croma, product, location, e);
                None
            }
        }
    }
}
