//! eBay Browse API integration.
//!
//! API docs: https://developer.ebay.com/api-docs/buy/browse/resources/item_summary/methods/search
//! Base URL: https://api.ebay.com/buy/browse/v1/
//! Auth: `Authorization: Bearer {application token}`
//! Region: `X-EBAY-C-MARKETPLACE-ID: EBAY_GB` (configurable)
//!
//! Both searches hit `/item_summary/search`; they differ only in the filter:
//! - active auctions: `filter=buyingOptions:{AUCTION}`, `sort=newlyListed`
//! - sold comparables: `filter=soldItemsOnly:true`

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use super::{Marketplace, ACTIVE_PAGE_SIZE, SOLD_PAGE_SIZE};
use crate::auth::AccessToken;
use crate::types::{ListingSnapshot, MarketplaceError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const PLATFORM_NAME: &str = "ebay";
const MARKETPLACE_HEADER: &str = "X-EBAY-C-MARKETPLACE-ID";
const AUCTION_FILTER: &str = "buyingOptions:{AUCTION}";
const SOLD_FILTER: &str = "soldItemsOnly:true";
const NEWEST_FIRST: &str = "newlyListed";

// ---------------------------------------------------------------------------
// API response types (eBay JSON → Rust)
// ---------------------------------------------------------------------------

/// Response of `/item_summary/search`. We only deserialize what we use.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    /// Absent entirely when nothing matched.
    #[serde(default)]
    item_summaries: Option<Vec<ItemSummary>>,
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemSummary {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    item_web_url: Option<String>,
    #[serde(default)]
    price: Option<ItemPrice>,
}

#[derive(Debug, Deserialize)]
struct ItemPrice {
    /// Usually a string such as `"129.99"`, occasionally a bare number.
    #[serde(default)]
    value: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// eBay Browse API client.
pub struct EbayClient {
    http: Client,
    base_url: String,
    marketplace_id: String,
}

impl EbayClient {
    pub fn new(base_url: String, marketplace_id: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("SNIPER/0.1.0 (auction-scanner)")
            .build()
            .context("Failed to build HTTP client for eBay")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            marketplace_id,
        })
    }

    // -- Internal helpers ------------------------------------------------

    async fn search(
        &self,
        params: &[(&str, String)],
        token: &AccessToken,
    ) -> Result<SearchResponse, MarketplaceError> {
        let url = format!("{}/item_summary/search", self.base_url);

        debug!(url = %url, params = ?params, "eBay search request");

        let resp = self
            .http
            .get(&url)
            .bearer_auth(token.bearer())
            .header(MARKETPLACE_HEADER, &self.marketplace_id)
            .query(params)
            .send()
            .await
            .map_err(MarketplaceError::Request)?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(MarketplaceError::Unauthorized);
        }

        let body = resp.text().await.map_err(MarketplaceError::Request)?;
        if !status.is_success() {
            return Err(MarketplaceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Self::parse_search(&body)
    }

    fn parse_search(body: &str) -> Result<SearchResponse, MarketplaceError> {
        serde_json::from_str(body).map_err(|e| MarketplaceError::Malformed(e.to_string()))
    }

    /// Read a price value that may arrive as a JSON string or number.
    /// Negative and non-numeric values yield `None`.
    fn parse_price(value: &serde_json::Value) -> Option<Decimal> {
        let parsed = match value {
            serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok(),
            serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
                .or_else(|_| Decimal::from_scientific(&n.to_string()))
                .ok(),
            _ => None,
        }?;
        (parsed >= Decimal::ZERO).then_some(parsed)
    }

    fn item_price(item: &ItemSummary) -> Option<Decimal> {
        item.price
            .as_ref()
            .and_then(|p| p.value.as_ref())
            .and_then(Self::parse_price)
    }

    /// Normalise item summaries into listings, dropping any without a
    /// title, link, or usable price.
    fn to_listings(resp: SearchResponse) -> Vec<ListingSnapshot> {
        resp.item_summaries
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| {
                let price = Self::item_price(&item);
                match (item.title, item.item_web_url, price) {
                    (Some(title), Some(link), Some(price)) => {
                        Some(ListingSnapshot::new(title, link, price))
                    }
                    (title, link, _) => {
                        debug!(title = ?title, link = ?link, "Skipping incomplete item summary");
                        None
                    }
                }
            })
            .collect()
    }

    fn to_prices(resp: SearchResponse) -> Vec<Decimal> {
        resp.item_summaries
            .unwrap_or_default()
            .iter()
            .filter_map(Self::item_price)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Marketplace trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl Marketplace for EbayClient {
    async fn search_active_auctions(
        &self,
        term: &str,
        token: &AccessToken,
    ) -> Result<Vec<ListingSnapshot>, MarketplaceError> {
        let params = [
            ("q", term.to_string()),
            ("filter", AUCTION_FILTER.to_string()),
            ("sort", NEWEST_FIRST.to_string()),
            ("limit", ACTIVE_PAGE_SIZE.to_string()),
        ];
        let resp = self.search(&params, token).await?;
        debug!(term, total = ?resp.total, "Active auction search complete");
        Ok(Self::to_listings(resp))
    }

    async fn search_sold_comparables(
        &self,
        title: &str,
        token: &AccessToken,
    ) -> Result<Vec<Decimal>, MarketplaceError> {
        let params = [
            ("q", title.to_string()),
            ("filter", SOLD_FILTER.to_string()),
            ("limit", SOLD_PAGE_SIZE.to_string()),
        ];
        let resp = self.search(&params, token).await?;
        Ok(Self::to_prices(resp))
    }

    fn name(&self) -> &str {
        PLATFORM_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn parse(body: serde_json::Value) -> SearchResponse {
        EbayClient::parse_search(&body.to_string()).unwrap()
    }

    #[test]
    fn test_parse_price_variants() {
        assert_eq!(EbayClient::parse_price(&json!("129.99")), Some(dec!(129.99)));
        assert_eq!(EbayClient::parse_price(&json!(" 40 ")), Some(dec!(40)));
        assert_eq!(EbayClient::parse_price(&json!(85.5)), Some(dec!(85.5)));
        assert_eq!(EbayClient::parse_price(&json!(12)), Some(dec!(12)));
        assert_eq!(EbayClient::parse_price(&json!("n/a")), None);
        assert_eq!(EbayClient::parse_price(&json!(null)), None);
        assert_eq!(EbayClient::parse_price(&json!({"v": 1})), None);
        assert_eq!(EbayClient::parse_price(&json!("-3.00")), None);
    }

    #[test]
    fn test_to_listings_preserves_order() {
        let resp = parse(json!({
            "total": 2,
            "itemSummaries": [
                {"title": "Canon EF 50mm", "itemWebUrl": "https://ebay.co.uk/itm/1",
                 "price": {"value": "45.00", "currency": "GBP"}},
                {"title": "Sony FE 85mm", "itemWebUrl": "https://ebay.co.uk/itm/2",
                 "price": {"value": "120.50", "currency": "GBP"}}
            ]
        }));

        let listings = EbayClient::to_listings(resp);
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].title, "Canon EF 50mm");
        assert_eq!(listings[0].current_price, dec!(45.00));
        assert_eq!(listings[1].link, "https://ebay.co.uk/itm/2");
    }

    #[test]
    fn test_to_listings_no_matches_is_empty() {
        let resp = parse(json!({"total": 0}));
        assert!(EbayClient::to_listings(resp).is_empty());
    }

    #[test]
    fn test_to_listings_skips_incomplete_items() {
        let resp = parse(json!({
            "itemSummaries": [
                {"title": "No price", "itemWebUrl": "https://ebay.co.uk/itm/1"},
                {"itemWebUrl": "https://ebay.co.uk/itm/2", "price": {"value": "10"}},
                {"title": "Good", "itemWebUrl": "https://ebay.co.uk/itm/3", "price": {"value": "10"}}
            ]
        }));
        let listings = EbayClient::to_listings(resp);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "Good");
    }

    #[test]
    fn test_to_prices_discards_non_numeric() {
        let resp = parse(json!({
            "itemSummaries": [
                {"title": "a", "price": {"value": "100.00", "currency": "GBP"}},
                {"title": "b", "price": {"value": "oops"}},
                {"title": "c"},
                {"title": "d", "price": {"value": 90}},
                {"title": "e", "price": {}}
            ]
        }));
        assert_eq!(EbayClient::to_prices(resp), vec![dec!(100.00), dec!(90)]);
    }

    #[test]
    fn test_parse_search_malformed() {
        let err = EbayClient::parse_search("not json").unwrap_err();
        assert!(matches!(err, MarketplaceError::Malformed(_)));
    }

    #[test]
    fn test_new_trims_base_url() {
        let client = EbayClient::new(
            "https://api.ebay.com/buy/browse/v1/".into(),
            "EBAY_GB".into(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://api.ebay.com/buy/browse/v1");
        assert_eq!(client.name(), "ebay");
    }
}
