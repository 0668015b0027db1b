use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationResult {
    pub delivered: usize,
    pub failed: usize,
}

impl NotificationResult {
    pub fn success(&self) -> bool {
        self.failed == 0 && self.delivered > 0
    }
}

/// Best-effort message delivery. Failures are logged and counted, never
/// returned and never retried.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> NotificationResult;
}
