use crate::http::retry_policy::RetryPolicy;
use serde::Deserialize;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Which stock source adapter the watcher drives.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Api,
    Page,
}

/// Which notification channel is active for this deployment.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    #[default]
    Telegram,
    Desktop,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub target_sku: String,
    pub target_name: Option<String>,
    #[serde(default)]
    pub stock_source: SourceKind,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub notifier: NotifierKind,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,
    pub reference_url: Option<String>,

    #[serde(default = "default_inventory_api_url")]
    pub inventory_api_url: String,
    #[serde(default = "default_storefront_url")]
    pub storefront_url: String,
    pub storefront_model: Option<String>,
    #[serde(default = "default_storefront_page_size")]
    pub storefront_page_size: u32,
    #[serde(default = "default_in_stock_sentinel")]
    pub in_stock_sentinel: String,
    #[serde(default = "default_page_wait_secs")]
    pub page_wait_secs: u64,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_retry_max_retries")]
    pub retry_max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

fn default_locale() -> String {
    "en-us".to_string()
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_inventory_api_url() -> String {
    "https://api.store.nvidia.com/partner/v1/feinventory".to_string()
}

fn default_storefront_url() -> String {
    "https://marketplace.nvidia.com".to_string()
}

fn default_storefront_page_size() -> u32 {
    12
}

fn default_in_stock_sentinel() -> String {
    "buy_now".to_string()
}

fn default_page_wait_secs() -> u64 {
    10
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_retry_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        let config = envy::from_env::<AppConfig>()?;
        config.validate()
    }

    /// Builds the configuration from an explicit list of variables instead of
    /// the process environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, AppConfig>(vars)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, envy::Error> {
        if self.target_sku.trim().is_empty() {
            return Err(envy::Error::Custom(
                "TARGET_SKU cannot be empty.".to_string(),
            ));
        }

        if self.poll_interval_secs == 0 {
            return Err(envy::Error::Custom(
                "POLL_INTERVAL_SECS must be a positive number of seconds.".to_string(),
            ));
        }

        if self.locale.trim().is_empty() {
            return Err(envy::Error::Custom("LOCALE cannot be empty.".to_string()));
        }

        if EnvFilter::try_new(&self.log_level).is_err() {
            return Err(envy::Error::Custom(format!(
                "LOG_LEVEL `{}` is not a valid filter directive.",
                self.log_level
            )));
        }

        if self.notifier == NotifierKind::Telegram {
            let token_missing = self
                .telegram_bot_token
                .as_deref()
                .map_or(true, |token| token.trim().is_empty());
            if token_missing {
                return Err(envy::Error::Custom(
                    "TELEGRAM_BOT_TOKEN is required for the telegram notifier.".to_string(),
                ));
            }

            let chat_missing = self
                .telegram_chat_id
                .as_deref()
                .map_or(true, |chat| chat.trim().is_empty());
            if chat_missing {
                return Err(envy::Error::Custom(
                    "TELEGRAM_CHAT_ID is required for the telegram notifier.".to_string(),
                ));
            }
        }

        if self.stock_source == SourceKind::Page {
            let has_product_name = [&self.target_name, &self.storefront_model]
                .into_iter()
                .flatten()
                .any(|name| !name.trim().is_empty());
            if !has_product_name {
                return Err(envy::Error::Custom(
                    "TARGET_NAME or STOREFRONT_MODEL is required for the page source; \
                     listing titles never contain the SKU."
                        .to_string(),
                ));
            }
        }

        if self.in_stock_sentinel.trim().is_empty() {
            return Err(envy::Error::Custom(
                "IN_STOCK_SENTINEL cannot be empty.".to_string(),
            ));
        }

        Ok(self)
    }

    /// Human-readable product name; falls back to the SKU.
    pub fn display_name(&self) -> &str {
        self.target_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.target_sku)
    }

    /// Name matched against storefront card titles: `TARGET_NAME`, then
    /// `STOREFRONT_MODEL`, then the SKU.
    pub fn listing_name(&self) -> &str {
        [&self.target_name, &self.storefront_model]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|name| !name.trim().is_empty())
            .unwrap_or(&self.target_sku)
    }

    /// Value of the listing page's `gpu` filter.
    pub fn listing_model(&self) -> &str {
        self.storefront_model
            .as_deref()
            .filter(|model| !model.trim().is_empty())
            .unwrap_or(self.listing_name())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn page_wait(&self) -> Duration {
        Duration::from_secs(self.page_wait_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_max_retries,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }
}
