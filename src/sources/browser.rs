//! Browser session abstraction used by the storefront page adapter.

use crate::errors::stock_error::StockError;
use crate::http::RetryingClient;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use scraper::{ElementRef, Html, Selector};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Snapshot of a matched element: its attributes and outer HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    attributes: Vec<(String, String)>,
    html: String,
}

impl ElementHandle {
    pub fn new(attributes: Vec<(String, String)>, html: impl Into<String>) -> Self {
        Self {
            attributes,
            html: html.into(),
        }
    }

    fn from_element(element: ElementRef<'_>) -> Self {
        let attributes = element
            .value()
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Self::new(attributes, element.html())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Minimal browser-automation surface the page adapter needs.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&mut self, url: &str) -> Result<(), StockError>;

    /// Wait until `selector` matches something on the current page.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration)
        -> Result<(), StockError>;

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>, StockError>;

    /// Match `selector` against the descendants of `element`.
    async fn query_within(
        &self,
        element: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, StockError>;

    fn get_attribute(&self, element: &ElementHandle, name: &str) -> Option<String> {
        element.attribute(name).map(str::to_string)
    }

    async fn close(&mut self);
}

fn parse_selector(selector: &str) -> Result<Selector, StockError> {
    Selector::parse(selector)
        .map_err(|err| StockError::Scrape(format!("invalid selector `{selector}`: {err:?}")))
}

fn select_all(document: &Html, selector: &Selector) -> Vec<ElementHandle> {
    document
        .select(selector)
        .map(ElementHandle::from_element)
        .collect()
}

/// Browser session over plain HTTP: fetches server-rendered markup and
/// evaluates selectors against it. Scripts are not executed.
pub struct StaticPageSession {
    client: RetryingClient,
    current_url: Option<String>,
    document: Option<String>,
    poll_interval: Duration,
    closed: bool,
}

impl StaticPageSession {
    pub fn new(client: RetryingClient) -> Self {
        Self {
            client,
            current_url: None,
            document: None,
            poll_interval: Duration::from_secs(1),
            closed: false,
        }
    }

    /// How often `wait_for_selector` re-fetches a page that lacks the selector.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn page(&self) -> Result<&str, StockError> {
        if self.closed {
            return Err(StockError::Scrape("browser session is closed".to_string()));
        }
        self.document
            .as_deref()
            .ok_or_else(|| StockError::Scrape("no page loaded".to_string()))
    }

    fn contains(&self, selector: &Selector) -> Result<bool, StockError> {
        let document = Html::parse_document(self.page()?);
        let found = document.select(selector).next().is_some();
        Ok(found)
    }

    async fn load(&mut self, url: &str) -> Result<(), StockError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));

        let response = self.client.get(url, &[], headers).await?;
        debug!(url = %url, bytes = response.body.len(), "Page loaded");
        self.document = Some(response.body);
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for StaticPageSession {
    async fn navigate(&mut self, url: &str) -> Result<(), StockError> {
        if self.closed {
            return Err(StockError::Scrape("browser session is closed".to_string()));
        }
        self.current_url = Some(url.to_string());
        self.load(url).await
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), StockError> {
        let parsed = parse_selector(selector)?;
        let deadline = Instant::now() + timeout;

        loop {
            if self.contains(&parsed)? {
                return Ok(());
            }
            if Instant::now() + self.poll_interval > deadline {
                return Err(StockError::Scrape(format!(
                    "`{selector}` did not appear within {}s",
                    timeout.as_secs()
                )));
            }

            tokio::time::sleep(self.poll_interval).await;
            let url = self
                .current_url
                .clone()
                .ok_or_else(|| StockError::Scrape("no page loaded".to_string()))?;
            self.load(&url).await?;
        }
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>, StockError> {
        let parsed = parse_selector(selector)?;
        let document = Html::parse_document(self.page()?);
        Ok(select_all(&document, &parsed))
    }

    async fn query_within(
        &self,
        element: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, StockError> {
        let parsed = parse_selector(selector)?;
        let fragment = Html::parse_fragment(element.html());
        // Fragments are wrapped in a synthetic <html>; the element is its first child.
        let matches = fragment
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .next()
            .map(|top| top.select(&parsed).map(ElementHandle::from_element).collect())
            .unwrap_or_default();
        Ok(matches)
    }

    async fn close(&mut self) {
        if !self.closed {
            info!(url = ?self.current_url, "Closing page session");
        }
        self.closed = true;
        self.document = None;
    }
}
