//! Shared types for the SNIPER agent.
//!
//! These types form the data model used across all modules.
//! They are kept free of I/O so that marketplace, alert, and engine
//! modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// One active auction as returned by a marketplace search.
///
/// Transient: only the `link` outlives a scan iteration, via the dedup ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingSnapshot {
    pub title: String,
    /// Listing web URL; doubles as the unique listing identifier.
    pub link: String,
    pub current_price: Decimal,
}

impl fmt::Display for ListingSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {:.2} ({})", self.title, self.current_price, self.link)
    }
}

impl ListingSnapshot {
    pub fn new(title: impl Into<String>, link: impl Into<String>, current_price: Decimal) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            current_price,
        }
    }
}

/// A listing whose resale spread cleared the profit threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Opportunity {
    pub listing: ListingSnapshot,
    pub estimate: Decimal,
    pub profit: Decimal,
    pub detected_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Strategy parameters
// ---------------------------------------------------------------------------

/// Alerting thresholds, fixed for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub min_profit: Decimal,
    pub max_price: Decimal,
}

/// Why a listing did not produce an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyAlerted,
    OverMaxPrice,
    NoEstimate,
    BelowMinProfit,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyAlerted => write!(f, "already alerted"),
            SkipReason::OverMaxPrice => write!(f, "over max price"),
            SkipReason::NoEstimate => write!(f, "insufficient sold data"),
            SkipReason::BelowMinProfit => write!(f, "below min profit"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cycle reporting
// ---------------------------------------------------------------------------

/// Summary of one full pass over every search term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub cycle_number: u64,
    pub terms_scanned: usize,
    pub listings_seen: usize,
    pub skipped_seen: usize,
    pub skipped_price: usize,
    pub skipped_no_estimate: usize,
    pub below_threshold: usize,
    pub alerts: Vec<Opportunity>,
}

impl CycleReport {
    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::AlreadyAlerted => self.skipped_seen += 1,
            SkipReason::OverMaxPrice => self.skipped_price += 1,
            SkipReason::NoEstimate => self.skipped_no_estimate += 1,
            SkipReason::BelowMinProfit => self.below_threshold += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Credential exchange failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Token request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed token response: {0}")]
    Malformed(String),
}

/// Marketplace search failures.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error("Search request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Access token rejected by marketplace")]
    Unauthorized,

    #[error("Marketplace error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed search response: {0}")]
    Malformed(String),
}

/// Anything that aborts a scan cycle and sends the supervisor into recovery.
#[derive(Debug, thiserror::Error)]
pub enum SniperError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Marketplace(#[from] MarketplaceError),
}

impl SniperError {
    /// Whether the failure points at a dead or revoked access token.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            SniperError::Auth(_) | SniperError::Marketplace(MarketplaceError::Unauthorized)
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
