//! # Storefront Page Adapter
//!
//! Checks availability by reading the vendor's graphics-card listing page.
//!
//! Each result card under `#resultsDiv` carries a title element with the
//! product name in `data-producttitle` and its purchase state in
//! `data-ctatype`; the price lives in a `data-price` attribute.

use super::browser::BrowserSession;
use super::{StockCheckResult, StockSource};
use crate::errors::stock_error::StockError;
use crate::utils::lenient_serde::parse_price;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const RESULTS_CONTAINER: &str = "#resultsDiv";
pub const RESULT_CARD: &str = "#resultsDiv > div";
pub const CARD_TITLE: &str = "h2[data-producttitle]";
pub const CARD_PRICE: &str = "[data-price]";

pub const TITLE_ATTR: &str = "data-producttitle";
pub const STATUS_ATTR: &str = "data-ctatype";
pub const PRICE_ATTR: &str = "data-price";

/// Build the listing URL for `locale` filtered to `model`.
pub fn listing_url(
    storefront: &str,
    locale: &str,
    page_size: u32,
    model: &str,
) -> Result<Url, String> {
    let base = format!(
        "{}/{}/consumer/graphics-cards/",
        storefront.trim_end_matches('/'),
        locale
    );
    let page_size = page_size.to_string();
    Url::parse_with_params(
        &base,
        &[
            ("locale", locale),
            ("page", "1"),
            ("limit", page_size.as_str()),
            ("category", "GPU"),
            ("gpu", model),
        ],
    )
    .map_err(|err| err.to_string())
}

pub struct StorefrontPageSource<B: BrowserSession> {
    session: B,
    url: String,
    target: String,
    display_name: String,
    in_stock_sentinel: String,
    wait_timeout: Duration,
}

impl<B: BrowserSession> StorefrontPageSource<B> {
    pub fn new(
        session: B,
        url: impl Into<String>,
        display_name: impl Into<String>,
        in_stock_sentinel: impl Into<String>,
        wait_timeout: Duration,
    ) -> Self {
        let display_name = display_name.into();
        Self {
            session,
            url: url.into(),
            target: display_name.to_lowercase(),
            display_name,
            in_stock_sentinel: in_stock_sentinel.into(),
            wait_timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn scan(&mut self) -> Result<StockCheckResult, StockError> {
        self.session.navigate(&self.url).await?;
        self.session
            .wait_for_selector(RESULTS_CONTAINER, self.wait_timeout)
            .await?;

        let cards = self.session.query_all(RESULT_CARD).await?;
        if cards.is_empty() {
            return Err(StockError::Scrape("results container has no product cards".to_string()));
        }
        debug!(cards = cards.len(), "Scanning product cards");

        for card in &cards {
            let Some(title) = self.session.query_within(card, CARD_TITLE).await?.into_iter().next()
            else {
                continue;
            };
            let Some(name) = self.session.get_attribute(&title, TITLE_ATTR) else {
                continue;
            };
            if !name.to_lowercase().contains(&self.target) {
                continue;
            }

            let status = self.session.get_attribute(&title, STATUS_ATTR);
            let price = self
                .session
                .query_within(card, CARD_PRICE)
                .await?
                .first()
                .and_then(|node| self.session.get_attribute(node, PRICE_ATTR))
                .and_then(|raw| parse_price(&raw));

            debug!(product = %name, status = ?status, price = ?price, "Matched product card");

            let in_stock = status
                .as_deref()
                .is_some_and(|status| status.trim().eq_ignore_ascii_case(&self.in_stock_sentinel));

            return Ok(if in_stock {
                StockCheckResult::in_stock(name, price, Some(self.url.clone()))
            } else {
                let mut result = StockCheckResult::unavailable(Some(name));
                result.price = price;
                result
            });
        }

        debug!(target_name = %self.display_name, "No product card matched the target");
        Ok(StockCheckResult::unavailable(None))
    }
}

#[async_trait]
impl<B: BrowserSession> StockSource for StorefrontPageSource<B> {
    fn name(&self) -> &'static str {
        "storefront-page"
    }

    async fn check_stock(&mut self) -> StockCheckResult {
        match self.scan().await {
            Ok(result) => {
                info!(
                    target_name = %self.display_name,
                    available = result.available,
                    price = ?result.price,
                    "Storefront check complete"
                );
                result
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "Storefront check failed");
                StockCheckResult::failed(&err)
            }
        }
    }

    async fn close(&mut self) {
        self.session.close().await;
    }
}
