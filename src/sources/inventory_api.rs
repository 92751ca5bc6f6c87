//! # Inventory API Adapter
//!
//! Checks availability through the vendor's JSON inventory endpoint.
//!
//! The endpoint is queried with `status`, `skus` and `locale` and answers
//! with an envelope of the form
//! `{ "success": true, "listMap": [{ "is_active": "true", "price": "1199" }] }`.

use super::{StockCheckResult, StockSource};
use crate::errors::stock_error::StockError;
use crate::http::RetryingClient;
use crate::utils::lenient_serde::{deserialize_flag, deserialize_price};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;
use tracing::{debug, info, warn};

//
// ----------- Data Structures -----------
//

/// Raw structure of the inventory API response.
#[derive(Debug, Deserialize)]
pub struct InventoryEnvelope {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub success: bool,
    #[serde(rename = "listMap", default)]
    pub list_map: Vec<InventoryListing>,
}

/// One product listing inside `listMap`.
#[derive(Debug, Deserialize, Clone)]
pub struct InventoryListing {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: Option<f64>,
    pub fe_sku: Option<String>,
    pub product_url: Option<String>,
}

/// Internal representation of the envelope, abstracting success and failure.
#[derive(Debug)]
pub enum InventoryResponse {
    Listed(Vec<InventoryListing>),
    Failure(String),
}

//
// ----------- Conversions -----------
//

impl From<InventoryEnvelope> for InventoryResponse {
    fn from(raw: InventoryEnvelope) -> Self {
        if raw.success {
            InventoryResponse::Listed(raw.list_map)
        } else {
            InventoryResponse::Failure("inventory API reported success=false".to_string())
        }
    }
}

//
// ----------- Adapter -----------
//

pub struct InventoryApiSource {
    client: RetryingClient,
    endpoint: String,
    sku: String,
    locale: String,
    display_name: String,
}

impl InventoryApiSource {
    pub fn new(
        client: RetryingClient,
        endpoint: impl Into<String>,
        sku: impl Into<String>,
        locale: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            sku: sku.into(),
            locale: locale.into(),
            display_name: display_name.into(),
        }
    }

    async fn fetch(&self) -> Result<StockCheckResult, StockError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let params = [
            ("status", "1"),
            ("skus", self.sku.as_str()),
            ("locale", self.locale.as_str()),
        ];
        let response = self.client.get(&self.endpoint, &params, headers).await?;
        debug!(status = %response.status, bytes = response.body.len(), "Inventory response received");

        let envelope: InventoryEnvelope = serde_json::from_str(&response.body)?;
        evaluate(InventoryResponse::from(envelope), &self.sku, &self.display_name)
    }
}

/// Decide availability for `sku` from a decoded inventory response.
///
/// # Errors
/// Returns `Parse` when the envelope reports failure.
pub fn evaluate(
    response: InventoryResponse,
    sku: &str,
    display_name: &str,
) -> Result<StockCheckResult, StockError> {
    let listings = match response {
        InventoryResponse::Listed(listings) => listings,
        InventoryResponse::Failure(message) => return Err(StockError::Parse(message)),
    };

    let listing = listings.into_iter().find(|listing| {
        listing
            .fe_sku
            .as_deref()
            .map_or(true, |listed| listed.eq_ignore_ascii_case(sku))
    });

    let Some(listing) = listing else {
        debug!(sku = %sku, "SKU not present in inventory listing");
        return Ok(StockCheckResult::unavailable(Some(display_name.to_string())));
    };

    if listing.is_active {
        Ok(StockCheckResult::in_stock(
            display_name.to_string(),
            listing.price,
            listing.product_url,
        ))
    } else {
        let mut result = StockCheckResult::unavailable(Some(display_name.to_string()));
        result.price = listing.price;
        Ok(result)
    }
}

#[async_trait]
impl StockSource for InventoryApiSource {
    fn name(&self) -> &'static str {
        "inventory-api"
    }

    async fn check_stock(&mut self) -> StockCheckResult {
        match self.fetch().await {
            Ok(result) => {
                info!(
                    sku = %self.sku,
                    available = result.available,
                    price = ?result.price,
                    "Inventory check complete"
                );
                result
            }
            Err(err) => {
                warn!(sku = %self.sku, kind = err.kind(), error = %err, "Inventory check failed");
                StockCheckResult::failed(&err)
            }
        }
    }

    async fn close(&mut self) {
        info!(endpoint = %self.endpoint, "Releasing inventory API client");
    }
}

//
// ----------- Tests -----------
//
