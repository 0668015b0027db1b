pub mod catalog;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod plugins;
pub mod utils;
pub mod web;

// Re-export commonly used types
pub use config::AppConfig;
pub use pipeline::{Aggregator, RunOutcome, StockWatcher};
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
