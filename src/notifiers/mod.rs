//! Notification channels and the best-effort notifier built on top of them.

use crate::sources::StockCheckResult;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

pub mod desktop;
pub mod telegram;

pub use desktop::DesktopChannel;
pub use telegram::TelegramChannel;

/// Errors from notify operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// A single delivery channel (chat bot, desktop toast, ...).
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// Channel name for logging.
    fn name(&self) -> &'static str;

    async fn send(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Formats stock messages and pushes them through the active channel.
///
/// Delivery failures are logged and swallowed; callers never see them.
pub struct Notifier {
    channel: Box<dyn NotifyChannel>,
    target: String,
    reference_url: Option<String>,
}

impl Notifier {
    pub fn new(
        channel: Box<dyn NotifyChannel>,
        target: impl Into<String>,
        reference_url: Option<String>,
    ) -> Self {
        Self {
            channel,
            target: target.into(),
            reference_url,
        }
    }

    pub fn channel_name(&self) -> &'static str {
        self.channel.name()
    }

    pub fn availability_title(&self) -> String {
        format!("🎮 {} available!", self.target)
    }

    pub fn availability_body(&self, result: &StockCheckResult) -> String {
        let mut lines = Vec::new();
        if let Some(name) = &result.display_name {
            lines.push(format!("Model: {name}"));
        }
        if let Some(price) = result.price {
            lines.push(format!("Price: {price}"));
        }
        if let Some(url) = result.product_url.as_ref().or(self.reference_url.as_ref()) {
            lines.push(format!("URL: {url}"));
        }
        lines.push(format!(
            "Checked: {}",
            result.checked_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        lines.join("\n")
    }

    pub fn error_title(&self) -> String {
        format!("⚠️ {} watcher error", self.target)
    }

    pub async fn notify_available(&self, result: &StockCheckResult) {
        let title = self.availability_title();
        let body = self.availability_body(result);
        self.deliver(&title, &body).await;
    }

    pub async fn notify_error(&self, message: &str) {
        let title = self.error_title();
        self.deliver(&title, message).await;
    }

    async fn deliver(&self, title: &str, body: &str) {
        match self.channel.send(title, body).await {
            Ok(()) => info!(channel = self.channel.name(), %title, "Notification sent"),
            Err(e) => error!(channel = self.channel.name(), %title, error = %e, "Notification failed"),
        }
    }
}
