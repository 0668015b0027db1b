pub mod checkers;
pub mod manager;
pub mod notifiers;
pub mod traits;

pub use manager::CheckerSet;
pub use traits::{AvailabilityChecker, NotificationResult, Notifier};
