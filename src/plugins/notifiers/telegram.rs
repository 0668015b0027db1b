use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::TelegramConfig;
use crate::plugins::traits::{NotificationResult, Notifier};
use crate::{AppError, Result};

/// Sends Markdown messages through the Telegram Bot API, once per
/// configured recipient chat.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    recipients: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

/// Escape the characters legacy Telegram Markdown treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            recipients: config.recipients.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }

    async fn send_to(&self, chat_id: &str, text: &str) -> Result<()> {
        let payload = SendMessage {
            chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Notify(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::Notify(format!("Telegram API returned {}: {}", status, body)))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> NotificationResult {
        let mut result = NotificationResult::default();

        if self.bot_token.is_empty() {
            warn!("Telegram bot token not configured, skipping notification");
            return result;
        }
        if self.recipients.is_empty() {
            warn!("No Telegram recipients configured, skipping notification");
            return result;
        }

        for (name, chat_id) in &self.recipients {
            match self.send_to(chat_id, text).await {
                Ok(()) => {
                    debug!(recipient = %name, "Telegram message delivered");
                    result.delivered += 1;
                }
                Err(e) => {
                    error!(recipient = %name, error = %e, "Failed to send Telegram message");
                    result.failed += 1;
                }
            }
        }

        info!(
            delivered = result.delivered,
            failed = result.failed,
            "Telegram notification finished"
        );
        result
    }
}
