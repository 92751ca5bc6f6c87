//! Stock source adapters.
//!
//! A [`StockSource`] answers one question per call: can the watched product
//! be bought right now? Two implementations exist, picked at startup:
//! the vendor's inventory API and the storefront listing page.

use crate::errors::stock_error::StockError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod browser;
pub mod inventory_api;
pub mod storefront_page;

pub use browser::{BrowserSession, ElementHandle, StaticPageSession};
pub use inventory_api::InventoryApiSource;
pub use storefront_page::StorefrontPageSource;

/// Outcome of a single stock check.
#[derive(Debug, Clone, PartialEq)]
pub struct StockCheckResult {
    pub available: bool,
    pub display_name: Option<String>,
    pub price: Option<f64>,
    pub product_url: Option<String>,
    pub raw_error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl StockCheckResult {
    /// The product was found (or not) and is not purchasable.
    pub fn unavailable(display_name: Option<String>) -> Self {
        Self {
            available: false,
            display_name,
            price: None,
            product_url: None,
            raw_error: None,
            checked_at: Utc::now(),
        }
    }

    pub fn in_stock(display_name: String, price: Option<f64>, product_url: Option<String>) -> Self {
        Self {
            available: true,
            display_name: Some(display_name),
            price,
            product_url,
            raw_error: None,
            checked_at: Utc::now(),
        }
    }

    /// The check itself failed; availability is unknown and reported as false.
    pub fn failed(err: &StockError) -> Self {
        Self {
            available: false,
            display_name: None,
            price: None,
            product_url: None,
            raw_error: Some(err.to_string()),
            checked_at: Utc::now(),
        }
    }
}

/// A vendor-specific way of checking stock.
#[async_trait]
pub trait StockSource: Send {
    /// Adapter name for logging.
    fn name(&self) -> &'static str;

    /// Perform one check. Never fails: errors are reported through
    /// [`StockCheckResult::raw_error`].
    async fn check_stock(&mut self) -> StockCheckResult;

    /// Release the underlying connection or browser session.
    async fn close(&mut self);
}
