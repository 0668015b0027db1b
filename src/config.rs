use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub trigger: TriggerConfig,
    pub check: CheckConfig,
    pub telegram: TelegramConfig,
    pub vendors: VendorsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/catalog.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Shared secret expected in the `secret` query parameter.
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Delivery postal codes, tried in order for location-scoped vendors.
    pub postal_codes: Vec<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            postal_codes: vec!["132001".to_string(), "110016".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub api_base: String,
    /// Display name -> chat id. Group ids are negative numbers.
    pub recipients: BTreeMap<String, String>,
    pub timeout_secs: u64,
    pub notify_when_empty: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base: "https://api.telegram.org".to_string(),
            recipients: BTreeMap::new(),
            timeout_secs: 10,
            notify_when_empty: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorsConfig {
    pub croma: CromaConfig,
    pub amazon: AmazonConfig,
    pub flipkart: FlipkartConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CromaConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub subscription_key: String,
    pub timeout_secs: u64,
}

impl Default for CromaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.croma.com/inventory/oms/v2/tms/details-pwa/".to_string(),
            subscription_key: String::new(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmazonConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub region: String,
    pub marketplace: String,
    pub access_key: String,
    pub secret_key: String,
    pub partner_tag: String,
    pub timeout_secs: u64,
}

impl Default for AmazonConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://webservices.amazon.in/paapi5/getitems".to_string(),
            region: "eu-west-1".to_string(),
            marketplace: "www.amazon.in".to_string(),
            access_key: String::new(),
            secret_key: String::new(),
            partner_tag: String::new(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipkartConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for FlipkartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://2.rome.api.flipkart.com/api/3/product/serviceability".to_string(),
            // Flipkart is slow to answer
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// When set, a daily rolling log file is written here as well.
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "STOCKWATCH_"
            .add_source(
                Environment::with_prefix("STOCKWATCH")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("check.postal_codes"),
            )
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;
        config.apply_legacy_env(|key| env::var(key).ok());

        config.validate()?;
        Ok(config)
    }

    /// Fills still-unset fields from the plain variable names used by older
    /// deployments (`DATABASE_URL`, `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`,
    /// `CRON_SECRET`).
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.database.url == DatabaseConfig::default().url {
            if let Some(url) = lookup("DATABASE_URL") {
                self.database.url = url;
            }
        }

        if self.telegram.bot_token.is_empty() {
            if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
                self.telegram.bot_token = token;
            }
        }

        if self.telegram.recipients.is_empty() {
            if let Some(chat_id) = lookup("TELEGRAM_CHAT_ID") {
                self.telegram.recipients.insert("default".to_string(), chat_id);
            }
        }

        if self.trigger.secret.is_empty() {
            if let Some(secret) = lookup("CRON_SECRET") {
                self.trigger.secret = secret;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port must be greater than 0".into()));
        }

        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Message("Database url must be set".into()));
        }

        if self.check.postal_codes.iter().all(|code| code.trim().is_empty()) {
            return Err(ConfigError::Message("At least one postal code must be configured".into()));
        }

        if Url::parse(&self.telegram.api_base).is_err() {
            return Err(ConfigError::Message("Invalid Telegram api_base URL".into()));
        }

        if self.telegram.timeout_secs == 0 {
            return Err(ConfigError::Message("Telegram timeout_secs must be greater than 0".into()));
        }

        let croma = &self.vendors.croma;
        if croma.enabled {
            Self::validate_endpoint("croma", &croma.endpoint, croma.timeout_secs)?;
            // Croma rejects every request without the subscription header
            if croma.subscription_key.trim().is_empty() {
                return Err(ConfigError::Message(
                    "Croma subscription_key is required when croma is enabled".into(),
                ));
            }
        }

        let amazon = &self.vendors.amazon;
        if amazon.enabled {
            Self::validate_endpoint("amazon", &amazon.endpoint, amazon.timeout_secs)?;
            if amazon.access_key.is_empty() || amazon.secret_key.is_empty() || amazon.partner_tag.is_empty() {
                return Err(ConfigError::Message(
                    "Amazon access_key, secret_key and partner_tag are required when amazon is enabled".into(),
                ));
            }
        }

        let flipkart = &self.vendors.flipkart;
        if flipkart.enabled {
            Self::validate_endpoint("flipkart", &flipkart.endpoint, flipkart.timeout_secs)?;
        }

        Ok(())
    }

    /// Checked only where the trigger endpoint is served. An empty secret
    /// would let any caller start a run.
    pub fn validate_trigger(&self) -> Result<(), ConfigError> {
        if self.trigger.secret.trim().is_empty() {
            return Err(ConfigError::Message("Trigger secret must be set".into()));
        }
        Ok(())
    }

    fn validate_endpoint(vendor: &str, endpoint: &str, timeout_secs: u64) -> Result<(), ConfigError> {
        if Url::parse(endpoint).is_err() {
            return Err(ConfigError::Message(format!("Invalid {} endpoint URL", vendor)));
        }
        if timeout_secs == 0 {
            return Err(ConfigError::Message(format!("{} timeout_secs must be greater than 0", vendor)));
        }
        Ok(())
    }
}
