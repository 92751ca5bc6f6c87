//! Desktop toast channel using notify-rust.

use super::{NotifyChannel, NotifyError};
use async_trait::async_trait;

const APP_NAME: &str = "gpu-stock-watcher";

#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopChannel;

impl DesktopChannel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyChannel for DesktopChannel {
    fn name(&self) -> &'static str {
        "desktop"
    }

    async fn send(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        let title = title.to_string();
        let body = body.to_string();
        // Notification::show() blocks on some platforms; keep it off the runtime.
        tokio::task::spawn_blocking(move || {
            notify_rust::Notification::new()
                .appname(APP_NAME)
                .summary(&title)
                .body(&body)
                .show()
                .map(|_| ())
                .map_err(|e| NotifyError::Delivery(e.to_string()))
        })
        .await
        .map_err(|e| NotifyError::Delivery(format!("toast task failed: {e}")))?
    }
}
