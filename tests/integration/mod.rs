// Integration tests for the stock watcher
// Real checkers, catalog and notifier against mocked vendor and Telegram HTTP

pub mod api_tests;
pub mod pipeline_tests;

use serde_json::{json, Value};
use std::path::Path;
use stock_watcher::{
    catalog::SqliteCatalog,
    models::{NewProduct, Vendor},
    AppConfig,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SECRET: &str = "it-secret";
pub const BOT_TOKEN: &str = "42:token";
pub const CROMA_PATH: &str = "/inventory/oms/v2/tms/details-pwa/";
pub const AMAZON_PATH: &str = "/paapi5/getitems";
pub const FLIPKART_PATH: &str = "/api/3/product/serviceability";

/// Every outbound endpoint points at `server`.
pub fn get_test_config(server: &MockServer, db_path: &Path) -> AppConfig {
    let mut config = AppConfig::default();

    config.database.url = format!("sqlite://{}", db_path.display());
    config.trigger.secret = SECRET.to_string();
    config.check.postal_codes = vec!["132001".to_string(), "110016".to_string()];

    config.telegram.bot_token = BOT_TOKEN.to_string();
    config.telegram.api_base = server.uri();
    config.telegram.recipients.insert("default".to_string(), "1001".to_string());

    config.vendors.croma.endpoint = format!("{}{}", server.uri(), CROMA_PATH);
    config.vendors.croma.subscription_key = "croma-key".to_string();
    config.vendors.croma.timeout_secs = 5;

    config.vendors.amazon.enabled = true;
    config.vendors.amazon.endpoint = format!("{}{}", server.uri(), AMAZON_PATH);
    config.vendors.amazon.access_key = "AKTEST".to_string();
    config.vendors.amazon.secret_key = "amazon-secret".to_string();
    config.vendors.amazon.partner_tag = "watcher-21".to_string();
    config.vendors.amazon.timeout_secs = 5;

    config.vendors.flipkart.endpoint = format!("{}{}", server.uri(), FLIPKART_PATH);
    config.vendors.flipkart.timeout_secs = 5;

    config
}

pub async fn create_test_catalog(db_path: &Path) -> anyhow::Result<SqliteCatalog> {
    let catalog = SqliteCatalog::from_path(db_path);
    catalog.ensure_schema().await?;
    Ok(catalog)
}

pub fn croma_product() -> NewProduct {
    NewProduct {
        name: "Apple iPhone 16 (128GB)".to_string(),
        url: "https://www.croma.com/apple-iphone-16/p/309740".to_string(),
        product_identifier: "309740".to_string(),
        vendor: Vendor::Croma,
        affiliate_link: Some("https://aff.example/iphone16".to_string()),
    }
}

pub fn amazon_product() -> NewProduct {
    NewProduct {
        name: "Apple iPhone 15 (128 GB)".to_string(),
        url: "https://www.amazon.in/dp/B0CHX1W1XY".to_string(),
        product_identifier: "B0CHX1W1XY".to_string(),
        vendor: Vendor::Amazon,
        affiliate_link: None,
    }
}

pub async fn mount_croma_deliverable(server: &MockServer, date: &str) {
    let body = json!({
        "promise": {
            "suggestedOption": {
                "option": {
                    "promiseLines": {
                        "promiseLine": [{
                            "itemID": "309740",
                            "assignments": { "assignment": [{ "deliveryDate": date }] }
                        }]
                    }
                }
            }
        }
    });

    Mock::given(method("POST"))
        .and(path(CROMA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_amazon_availability(server: &MockServer, message: &str) {
    let body = json!({
        "ItemsResult": {
            "Items": [{
                "ASIN": "B0CHX1W1XY",
                "Offers": {
                    "Listings": [{
                        "Price": { "DisplayAmount": "₹69,900.00" },
                        "Availability": { "Message": message }
                    }]
                }
            }]
        }
    });

    Mock::given(method("POST"))
        .and(path(AMAZON_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_telegram(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", BOT_TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(server)
        .await;
}

/// Texts of every Telegram message the mock received, in order.
pub async fn sent_messages(server: &MockServer) -> Vec<String> {
    let suffix = format!("/bot{}/sendMessage", BOT_TOKEN);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == suffix)
        .filter_map(|request| serde_json::from_slice::<Value>(&request.body).ok())
        .filter_map(|body| body["text"].as_str().map(str::to_string))
        .collect()
}

/// Number of requests the mock received on `vendor_path`.
pub async fn vendor_calls(server: &MockServer, vendor_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == vendor_path)
        .count()
}
