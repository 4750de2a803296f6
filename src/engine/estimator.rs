//! Resale value estimation.
//!
//! The estimate is the plain arithmetic mean of recent sold prices for the
//! listing title. Fewer than [`MIN_SOLD_SAMPLES`] usable prices means no
//! estimate at all. No outlier rejection, no recency weighting, no caching
//! between calls.

use rust_decimal::Decimal;
use tracing::debug;

use crate::auth::AccessToken;
use crate::marketplace::Marketplace;
use crate::types::MarketplaceError;

/// Minimum sold comparables required before a price is trusted.
pub const MIN_SOLD_SAMPLES: usize = 5;

/// Mean of `prices`, or `None` when the sample is too small or its total
/// does not fit in a `Decimal`.
pub fn mean_resale(prices: &[Decimal]) -> Option<Decimal> {
    if prices.len() < MIN_SOLD_SAMPLES {
        return None;
    }
    let total = prices
        .iter()
        .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(*p))?;
    total.checked_div(Decimal::from(prices.len()))
}

/// Estimates resale value from a marketplace's sold listings.
pub struct ResaleEstimator<'a> {
    marketplace: &'a dyn Marketplace,
}

impl<'a> ResaleEstimator<'a> {
    pub fn new(marketplace: &'a dyn Marketplace) -> Self {
        Self { marketplace }
    }

    /// Expected resale value for `title`, or `Ok(None)` on insufficient data.
    pub async fn estimate(
        &self,
        title: &str,
        token: &AccessToken,
    ) -> Result<Option<Decimal>, MarketplaceError> {
        let prices = self.marketplace.search_sold_comparables(title, token).await?;
        let estimate = mean_resale(&prices);
        debug!(
            title,
            samples = prices.len(),
            estimate = ?estimate,
            "Resale estimate"
        );
        Ok(estimate)
    }
}
