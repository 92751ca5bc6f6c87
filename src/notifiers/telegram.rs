//! Telegram bot channel: posts to the Bot API `sendMessage` method.

use super::{NotifyChannel, NotifyError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: String,
}

/// Acknowledgement returned by the Bot API.
#[derive(Debug, Deserialize)]
struct SendMessageAck {
    ok: bool,
    description: Option<String>,
}

#[derive(Clone)]
pub struct TelegramChannel {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramChannel {
    pub fn new(
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

// Keeps the bot token out of logs.
impl fmt::Debug for TelegramChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramChannel")
            .field("api_base", &self.api_base)
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[async_trait]
impl NotifyChannel for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text: format!("{title}\n{body}"),
        };

        // reqwest errors embed the URL, which contains the token.
        let response = self
            .client
            .post(self.send_message_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.without_url().to_string()))?;

        let status = response.status();
        let ack = response
            .json::<SendMessageAck>()
            .await
            .map_err(|e| NotifyError::Delivery(format!("status {status}: {}", e.without_url())))?;

        if ack.ok {
            Ok(())
        } else {
            Err(NotifyError::Delivery(format!(
                "status {status}: {}",
                ack.description.unwrap_or_else(|| "no description".to_string())
            )))
        }
    }
}
