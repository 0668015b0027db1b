use super::*;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use stock_watcher::web::{create_router, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body)?).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

#[tokio::test]
async fn test_trigger_end_to_end() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let dir = TempDir::new()?;
    let db_path = dir.path().join("catalog.db");
    create_test_catalog(&db_path).await?;

    mount_croma_deliverable(&server, "2025-03-14").await;
    mount_amazon_availability(&server, "In stock").await;
    mount_telegram(&server).await;

    let config = get_test_config(&server, &db_path);
    let app = create_router(AppState::from_config(&config)?);

    // Catalog is filled through the admin API
    for url in [
        "https://www.croma.com/apple-iphone-16/p/309740",
        "https://www.amazon.in/Apple-iPhone-15/dp/B0CHX1W1XY",
    ] {
        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/v1/products?secret={}", SECRET),
            Some(json!({ "url": url })),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = call(&app, Method::GET, "/api/check?secret=wrong", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
    assert_eq!(vendor_calls(&server, CROMA_PATH).await, 0);

    let (status, body) = call(&app, Method::GET, &format!("/api/check?secret={}", SECRET), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "found": 2 }));

    let messages = sent_messages(&server).await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("💰 ₹69,900.00"));
    assert!(messages[0].contains("Amazon: 1/1 available"));
    Ok(())
}

#[tokio::test]
async fn test_admin_listing_and_delete() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let dir = TempDir::new()?;
    let db_path = dir.path().join("catalog.db");
    let catalog = create_test_catalog(&db_path).await?;
    let product = catalog.insert_product(croma_product()).await?;
    catalog
        .insert_product(NewProduct {
            name: "(Vivo) vivo x200 pro...".to_string(),
            url: "https://shop.vivo.com/in/product/vivo-x200-pro/10048".to_string(),
            product_identifier: "10048".to_string(),
            vendor: Vendor::Unsupported("vivo".to_string()),
            affiliate_link: None,
        })
        .await?;

    let config = get_test_config(&server, &db_path);
    let app = create_router(AppState::from_config(&config)?);

    let (status, body) = call(&app, Method::GET, &format!("/api/v1/products?secret={}", SECRET), None).await?;
    assert_eq!(status, StatusCode::OK);
    let vendors: Vec<&str> = body["data"]
        .as_array()
        .map(|items| items.iter().filter_map(|p| p["vendor"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(vendors, vec!["croma", "vivo"]);

    let uri = format!("/api/v1/products/{}?secret={}", product.id, SECRET);
    let (status, _) = call(&app, Method::DELETE, &uri, None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::DELETE, &uri, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_health_needs_no_secret() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let dir = TempDir::new()?;
    let config = get_test_config(&server, &dir.path().join("catalog.db"));
    let app = create_router(AppState::from_config(&config)?);

    let (status, body) = call(&app, Method::GET, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "stock-watcher");
    Ok(())
}
