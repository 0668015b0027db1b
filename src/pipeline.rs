//! One run: load the catalog, check every product, send the alert.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::catalog::CatalogSource;
use crate::config::AppConfig;
use crate::models::{AvailabilityResult, Product, RunSummary};
use crate::plugins::notifiers::telegram::escape_markdown;
use crate::plugins::notifiers::TelegramNotifier;
use crate::plugins::{AvailabilityChecker, CheckerSet, Notifier};
use crate::Result;

pub const CATALOG_FAILURE_MESSAGE: &str = "❌ Checker failed to connect to the catalog.";

const ALERT_HEADER: &str = "🔥 *Stock Alert!*";
const EMPTY_HEADER: &str = "😴 *No stock found this run*";
const SUMMARY_HEADER: &str = "📊 *Summary*";

/// Walks the catalog and asks the matching checker about every product.
pub struct Aggregator {
    catalog: Arc<dyn CatalogSource>,
    checkers: CheckerSet,
    postal_codes: Vec<String>,
}

impl Aggregator {
    pub fn new(catalog: Arc<dyn CatalogSource>, checkers: CheckerSet, postal_codes: Vec<String>) -> Self {
        Self {
            catalog,
            checkers,
            postal_codes,
        }
    }

    /// Only a catalog failure is an error; vendor problems count as "not available".
    pub async fn run(&self) -> Result<RunSummary> {
        let products = self.catalog.load_products(None).await?;
        info!(products = products.len(), "Starting availability run");

        let mut summary = RunSummary::new();

        for product in &products {
            let Some(checker) = self.checkers.for_vendor(&product.vendor) else {
                debug!(vendor = %product.vendor, product = %product.name, "No checker for vendor, skipping");
                summary.record_skipped();
                continue;
            };

            summary.record_checked(&product.vendor);

            if let Some(result) = self.check_product(checker, product).await {
                info!(
                    vendor = %result.vendor,
                    product = %result.product_name,
                    location = result.location.as_deref().unwrap_or("-"),
                    "Product available"
                );
                summary.record_available(result);
            }
        }

        info!(
            checked = summary.total_checked(),
            found = summary.found(),
            skipped = summary.skipped,
            "Availability run finished"
        );
        Ok(summary)
    }

    async fn check_product(&self, checker: &dyn AvailabilityChecker, product: &Product) -> Option<AvailabilityResult> {
        if !checker.location_scoped() {
            return checker.check(product, None).await;
        }

        for postal_code in &self.postal_codes {
            if let Some(result) = checker.check(product, Some(postal_code.as_str())).await {
                return Some(result);
            }
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(RunSummary),
    CatalogUnavailable,
}

impl RunOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            RunOutcome::Completed(_) => "ok",
            RunOutcome::CatalogUnavailable => "catalog_unavailable",
        }
    }

    pub fn found(&self) -> usize {
        match self {
            RunOutcome::Completed(summary) => summary.found(),
            RunOutcome::CatalogUnavailable => 0,
        }
    }
}

/// Aggregator plus notifier: what the trigger and the `check` command run.
pub struct StockWatcher {
    aggregator: Aggregator,
    notifier: Arc<dyn Notifier>,
    notify_when_empty: bool,
}

impl StockWatcher {
    pub fn new(aggregator: Aggregator, notifier: Arc<dyn Notifier>, notify_when_empty: bool) -> Self {
        Self {
            aggregator,
            notifier,
            notify_when_empty,
        }
    }

    /// Real vendor checkers and Telegram, reading products from `catalog`.
    pub fn from_config(config: &AppConfig, catalog: Arc<dyn CatalogSource>) -> Result<Self> {
        let aggregator = Aggregator::new(
            catalog,
            CheckerSet::from_config(&config.vendors)?,
            config.check.postal_codes.clone(),
        );
        let notifier = Arc::new(TelegramNotifier::new(&config.telegram)?);

        Ok(Self::new(aggregator, notifier, config.telegram.notify_when_empty))
    }

    pub async fn run_and_notify(&self) -> RunOutcome {
        let summary = match self.aggregator.run().await {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %e, "Catalog unavailable, run aborted");
                let sent = self.notifier.send(CATALOG_FAILURE_MESSAGE).await;
                if !sent.success() {
                    warn!(failed = sent.failed, "Catalog failure notification not delivered");
                }
                return RunOutcome::CatalogUnavailable;
            }
        };

        if summary.found() == 0 && !self.notify_when_empty {
            info!("Nothing in stock, no alert sent");
            return RunOutcome::Completed(summary);
        }

        let sent = self.notifier.send(&compose_alert(&summary)).await;
        if !sent.success() {
            warn!(delivered = sent.delivered, failed = sent.failed, "Stock alert not fully delivered");
        }

        RunOutcome::Completed(summary)
    }
}

/// Telegram Markdown alert: header, one block per positive result, summary.
pub fn compose_alert(summary: &RunSummary) -> String {
    let header = if summary.results.is_empty() {
        EMPTY_HEADER
    } else {
        ALERT_HEADER
    };

    let mut sections = vec![header.to_string()];
    sections.extend(summary.results.iter().map(result_block));

    let mut lines = vec![SUMMARY_HEADER.to_string()];
    for (vendor, tally) in &summary.tallies {
        if tally.checked > 0 {
            lines.push(format!("{}: {}/{} available", vendor, tally.available, tally.checked));
        }
    }
    if summary.skipped > 0 {
        lines.push(format!("Skipped (no checker): {}", summary.skipped));
    }
    sections.push(lines.join("\n"));

    sections.join("\n\n")
}

fn result_block(result: &AvailabilityResult) -> String {
    let mut block = match &result.message {
        Some(message) => message.clone(),
        None => {
            let place = match &result.location {
                Some(code) => format!("{} ({})", result.vendor, code),
                None => result.vendor.to_string(),
            };
            format!(
                "✅ *In Stock at {}*\n[{}]({})",
                place,
                escape_markdown(&result.product_name),
                result.link
            )
        }
    };

    if let Some(price) = &result.price {
        block.push_str(&format!("\n💰 {}", price));
    }
    block
}
