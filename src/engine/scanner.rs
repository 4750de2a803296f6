//! Opportunity scanner.
//!
//! One cycle walks every configured search term in order. For each term it
//! fetches the newest auctions and, for each listing in the order the
//! marketplace returned them:
//!
//! 1. skip if the link was already alerted
//! 2. skip if the current price is above `max_price`
//! 3. estimate resale value from sold comparables; skip if unavailable
//! 4. alert and record the link when `estimate - price >= min_profit`
//!
//! Everything runs sequentially. The first marketplace error aborts the
//! rest of the cycle, including terms not yet visited; recovery is the
//! supervisor's job.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::alerts::{format_alert, Notifier};
use crate::auth::AccessToken;
use crate::engine::estimator::ResaleEstimator;
use crate::engine::ledger::DedupLedger;
use crate::marketplace::Marketplace;
use crate::types::{CycleReport, ListingSnapshot, Opportunity, SkipReason, SniperError, Thresholds};

/// Profit for a listing if it clears both thresholds, otherwise why not.
pub fn assess(
    price: Decimal,
    estimate: Decimal,
    thresholds: &Thresholds,
) -> Result<Decimal, SkipReason> {
    if price > thresholds.max_price {
        return Err(SkipReason::OverMaxPrice);
    }
    let profit = estimate - price;
    if profit >= thresholds.min_profit {
        Ok(profit)
    } else {
        Err(SkipReason::BelowMinProfit)
    }
}

pub struct OpportunityScanner {
    terms: Vec<String>,
    thresholds: Thresholds,
    currency: String,
    ledger: DedupLedger,
}

impl OpportunityScanner {
    pub fn new(terms: Vec<String>, thresholds: Thresholds, currency: impl Into<String>) -> Self {
        let terms = terms
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Self {
            terms,
            thresholds,
            currency: currency.into(),
            ledger: DedupLedger::new(),
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    /// Run one full pass over all search terms.
    pub async fn run_cycle(
        &mut self,
        marketplace: &dyn Marketplace,
        notifier: &dyn Notifier,
        token: &AccessToken,
        cycle_number: u64,
    ) -> Result<CycleReport, SniperError> {
        let mut report = CycleReport {
            cycle_number,
            ..CycleReport::default()
        };
        let estimator = ResaleEstimator::new(marketplace);

        for term in &self.terms {
            info!(term = %term, "Scanning");

            let listings = marketplace.search_active_auctions(term, token).await?;
            report.terms_scanned += 1;
            report.listings_seen += listings.len();

            for listing in listings {
                match Self::evaluate(&self.ledger, &self.thresholds, &estimator, &listing, token)
                    .await?
                {
                    Ok((estimate, profit)) => {
                        let opp = Opportunity {
                            listing,
                            estimate,
                            profit,
                            detected_at: Utc::now(),
                        };
                        notifier.notify(&format_alert(&opp, &self.currency)).await;
                        self.ledger.record(&opp.listing.link);
                        info!(
                            title = %opp.listing.title,
                            price = %opp.listing.current_price,
                            estimate = %opp.estimate.round_dp(2),
                            profit = %opp.profit.round_dp(2),
                            link = %opp.listing.link,
                            detected_at = %opp.detected_at.to_rfc3339(),
                            "Opportunity alerted"
                        );
                        report.alerts.push(opp);
                    }
                    Err(reason) => {
                        debug!(listing = %listing, reason = %reason, "Listing skipped");
                        report.record_skip(reason);
                    }
                }
            }
        }

        Ok(report)
    }

    /// Decide a single listing. The outer `Result` carries marketplace
    /// failures, the inner one the alert decision.
    async fn evaluate(
        ledger: &DedupLedger,
        thresholds: &Thresholds,
        estimator: &ResaleEstimator<'_>,
        listing: &ListingSnapshot,
        token: &AccessToken,
    ) -> Result<Result<(Decimal, Decimal), SkipReason>, SniperError> {
        if ledger.seen(&listing.link) {
            return Ok(Err(SkipReason::AlreadyAlerted));
        }
        if listing.current_price > thresholds.max_price {
            return Ok(Err(SkipReason::OverMaxPrice));
        }
        let Some(estimate) = estimator.estimate(&listing.title, token).await? else {
            return Ok(Err(SkipReason::NoEstimate));
        };
        Ok(assess(listing.current_price, estimate, thresholds).map(|profit| (estimate, profit)))
    }
}
