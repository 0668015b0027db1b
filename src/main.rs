use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use stock_watcher::catalog::{CatalogSource, SqliteCatalog};
use stock_watcher::models::{NewProduct, Product, Vendor};
use stock_watcher::pipeline::compose_alert;
use stock_watcher::plugins::notifiers::TelegramNotifier;
use stock_watcher::plugins::{CheckerSet, Notifier};
use stock_watcher::utils::logging;
use stock_watcher::{web, AppConfig, RunOutcome, StockWatcher};

#[derive(Debug, Parser)]
#[command(name = "stock-watcher")]
#[command(version, about = "Polls retailer APIs for product availability and alerts on Telegram")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Run one full check locally and print the alert
    Check,
    /// Ask a single vendor about a single item
    Probe {
        #[arg(long)]
        vendor: String,
        /// Vendor item id: Croma item code, ASIN or Flipkart pid
        #[arg(long)]
        id: String,
        #[arg(long)]
        postal_code: Option<String>,
    },
    /// Send a message to every configured recipient
    TestNotify {
        #[arg(long, default_value = "✅ Stock watcher test message")]
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let _guard = logging::init(&config.logging)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!(version = env!("CARGO_PKG_VERSION"), "Starting stock watcher");
            web::serve(config).await
        }
        Commands::Check => run_check(&config).await,
        Commands::Probe {
            vendor,
            id,
            postal_code,
        } => probe(&config, &vendor, &id, postal_code).await,
        Commands::TestNotify { message } => test_notify(&config, &message).await,
    }
}

async fn run_check(config: &AppConfig) -> Result<()> {
    let catalog = Arc::new(SqliteCatalog::new(&config.database.url)?);
    catalog.ensure_schema().await?;

    let source: Arc<dyn CatalogSource> = catalog;
    let watcher = StockWatcher::from_config(config, source)?;

    match watcher.run_and_notify().await {
        RunOutcome::Completed(summary) => println!("{}", compose_alert(&summary)),
        RunOutcome::CatalogUnavailable => bail!("catalog unavailable, see log for details"),
    }
    Ok(())
}

async fn probe(config: &AppConfig, vendor: &str, id: &str, postal_code: Option<String>) -> Result<()> {
    let vendor = Vendor::from_tag(vendor);
    let checkers = CheckerSet::from_config(&config.vendors)?;
    let Some(checker) = checkers.for_vendor(&vendor) else {
        bail!("no checker for vendor '{}'", vendor);
    };

    let product = Product::new(NewProduct {
        name: format!("{} {}", vendor, id),
        url: format!("probe:{}/{}", vendor.tag(), id),
        product_identifier: id.to_string(),
        vendor: vendor.clone(),
        affiliate_link: None,
    });

    let locations: Vec<Option<String>> = match postal_code {
        Some(code) => vec![Some(code)],
        None if checker.location_scoped() => config.check.postal_codes.iter().cloned().map(Some).collect(),
        None => vec![None],
    };

    for location in locations {
        let place = location.as_deref().unwrap_or("-");
        match checker.check(&product, location.as_deref()).await {
            Some(result) => {
                println!("{} @ {}: available", vendor, place);
                if let Some(message) = result.message {
                    println!("{}", message);
                }
            }
            None => println!("{} @ {}: not available", vendor, place),
        }
    }
    Ok(())
}

async fn test_notify(config: &AppConfig, message: &str) -> Result<()> {
    let notifier = TelegramNotifier::new(&config.telegram)?;
    let result = notifier.send(message).await;

    println!("delivered: {}, failed: {}", result.delivered, result.failed);
    if !result.success() {
        bail!("test notification was not delivered to every recipient");
    }
    Ok(())
}
