use thiserror::Error;

/// Failures a stock source can hit while performing one check.
///
/// None of these leave the adapter: they are folded into a
/// `StockCheckResult` with `raw_error` set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    #[error("transport error after {attempts} attempt(s): {message}")]
    Transport { message: String, attempts: u32 },

    #[error("HTTP status {status} after {attempts} attempt(s)")]
    HttpStatus { status: u16, attempts: u32 },

    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("page scrape failed: {0}")]
    Scrape(String),
}

impl StockError {
    /// Short machine-friendly label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            StockError::Transport { .. } => "transport",
            StockError::HttpStatus { .. } => "http_status",
            StockError::Parse(_) => "parse",
            StockError::Scrape(_) => "scrape",
        }
    }
}

impl From<serde_json::Error> for StockError {
    fn from(err: serde_json::Error) -> Self {
        StockError::Parse(err.to_string())
    }
}
