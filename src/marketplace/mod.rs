//! Marketplace integrations.
//!
//! Defines the `Marketplace` trait and provides the eBay Browse API
//! implementation. Both operations are read-only and take the access
//! token explicitly; no client ever fetches or caches a token itself.

pub mod ebay;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::auth::AccessToken;
use crate::types::{ListingSnapshot, MarketplaceError};

/// Page size for active-auction searches.
pub const ACTIVE_PAGE_SIZE: u32 = 25;

/// Page size for sold-comparable searches.
pub const SOLD_PAGE_SIZE: u32 = 15;

/// Abstraction over a listings marketplace.
#[async_trait]
pub trait Marketplace: Send + Sync {
    /// Newly listed auction-format items matching `term`, newest first,
    /// in the order the marketplace returned them. No matches is `Ok(vec![])`.
    async fn search_active_auctions(
        &self,
        term: &str,
        token: &AccessToken,
    ) -> Result<Vec<ListingSnapshot>, MarketplaceError>;

    /// Sale prices of recently sold items matching `title`.
    /// Items without a numeric price are dropped.
    async fn search_sold_comparables(
        &self,
        title: &str,
        token: &AccessToken,
    ) -> Result<Vec<Decimal>, MarketplaceError>;

    /// Marketplace name for logging.
    fn name(&self) -> &str;
}
