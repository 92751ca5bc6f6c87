use crate::errors::stock_error::StockError;
use crate::http::retry_policy::RetryPolicy;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// Browser-like user agent; the vendor endpoints reject reqwest's default.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Successful response with its body read to a string.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// `reqwest::Client` wrapper that applies a [`RetryPolicy`] to GET requests.
#[derive(Debug, Clone)]
pub struct RetryingClient {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl RetryingClient {
    pub fn new(timeout: Duration, policy: RetryPolicy) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, policy })
    }

    /// Issue a GET, retrying 5xx responses and transport failures.
    ///
    /// # Errors
    /// - `HttpStatus` for a 4xx, or a 5xx once the retry budget is spent.
    /// - `Transport` when the last attempt failed before a response arrived.
    pub async fn get(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: HeaderMap,
    ) -> Result<HttpResponse, StockError> {
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(url = %url, attempt = attempts, "Sending GET request");

            let outcome = self
                .client
                .get(url)
                .query(params)
                .headers(headers.clone())
                .send()
                .await;

            let retry_reason = match outcome {
                Ok(response) if response.status().is_success() => {
                    let status = response.status();
                    match response.text().await {
                        Ok(body) => return Ok(HttpResponse { status, body }),
                        Err(err) => {
                            if !self.policy.has_attempts_left(attempts) {
                                return Err(StockError::Transport {
                                    message: err.to_string(),
                                    attempts,
                                });
                            }
                            format!("body read failed: {err}")
                        }
                    }
                }
                Ok(response) => {
                    let status = response.status();
                    if !RetryPolicy::is_retryable_status(status)
                        || !self.policy.has_attempts_left(attempts)
                    {
                        return Err(StockError::HttpStatus {
                            status: status.as_u16(),
                            attempts,
                        });
                    }
                    format!("status {status}")
                }
                Err(err) => {
                    if !RetryPolicy::is_retryable_transport(&err)
                        || !self.policy.has_attempts_left(attempts)
                    {
                        return Err(StockError::Transport {
                            message: err.to_string(),
                            attempts,
                        });
                    }
                    err.to_string()
                }
            };

            let delay = self.policy.delay_for(attempts - 1);
            warn!(
                url = %url,
                attempt = attempts,
                max_attempts = self.policy.max_attempts(),
                delay_ms = delay.as_millis() as u64,
                reason = %retry_reason,
                "Request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
