use super::*;
use std::sync::Arc;
use stock_watcher::catalog::CatalogSource;
use stock_watcher::{RunOutcome, StockWatcher};
use tempfile::TempDir;

#[tokio::test]
async fn test_croma_deliverable_amazon_unavailable() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let dir = TempDir::new()?;
    let db_path = dir.path().join("catalog.db");

    let catalog = create_test_catalog(&db_path).await?;
    catalog.insert_product(croma_product()).await?;
    catalog.insert_product(amazon_product()).await?;

    mount_croma_deliverable(&server, "2025-03-14").await;
    mount_amazon_availability(&server, "Currently unavailable.").await;
    mount_telegram(&server).await;

    let config = get_test_config(&server, &db_path);
    let source: Arc<dyn CatalogSource> = Arc::new(catalog);
    let watcher = StockWatcher::from_config(&config, source)?;

    let outcome = watcher.run_and_notify().await;
    assert_eq!(outcome.status(), "ok");
    assert_eq!(outcome.found(), 1);

    // First postal code answered, the second was never asked
    assert_eq!(vendor_calls(&server, CROMA_PATH).await, 1);
    assert_eq!(vendor_calls(&server, AMAZON_PATH).await, 1);

    let messages = sent_messages(&server).await;
    assert_eq!(messages.len(), 1);
    let alert = &messages[0];

    assert!(alert.starts_with("🔥 *Stock Alert!*"));
    assert_eq!(alert.matches("✅ *In Stock at").count(), 1);
    assert!(alert.contains("✅ *In Stock at Croma (132001)*"));
    assert!(alert.contains("(https://aff.example/iphone16)"));
    assert!(alert.contains("Croma: 1/1 available"));
    assert!(alert.contains("Amazon: 0/1 available"));
    assert!(!alert.contains("Flipkart:"));
    Ok(())
}

#[tokio::test]
async fn test_nothing_in_stock_sends_nothing() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let dir = TempDir::new()?;
    let db_path = dir.path().join("catalog.db");

    let catalog = create_test_catalog(&db_path).await?;
    catalog.insert_product(amazon_product()).await?;

    mount_amazon_availability(&server, "Currently unavailable.").await;
    mount_telegram(&server).await;

    let config = get_test_config(&server, &db_path);
    let watcher = StockWatcher::from_config(&config, Arc::new(catalog))?;

    let outcome = watcher.run_and_notify().await;
    match outcome {
        RunOutcome::Completed(summary) => assert_eq!(summary.total_checked(), 1),
        RunOutcome::CatalogUnavailable => panic!("catalog should be reachable"),
    }
    assert!(sent_messages(&server).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_missing_catalog_reports_failure() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_telegram(&server).await;

    let config = get_test_config(&server, Path::new("/nonexistent/dir/catalog.db"));
    let catalog = SqliteCatalog::from_path("/nonexistent/dir/catalog.db");
    let watcher = StockWatcher::from_config(&config, Arc::new(catalog))?;

    let outcome = watcher.run_and_notify().await;
    assert_eq!(outcome, RunOutcome::CatalogUnavailable);

    let messages = sent_messages(&server).await;
    assert_eq!(messages, vec!["❌ Checker failed to connect to the catalog.".to_string()]);
    assert_eq!(vendor_calls(&server, CROMA_PATH).await, 0);
    assert_eq!(vendor_calls(&server, AMAZON_PATH).await, 0);
    Ok(())
}
