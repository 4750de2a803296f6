//! In-memory doubles for integration testing.
//!
//! Deterministic `Marketplace`, `Notifier`, and `TokenProvider`
//! implementations with no network access. State lives behind `Arc`s so a
//! test can keep a handle after boxing a clone into the engine.

#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sniper::alerts::Notifier;
use sniper::auth::{AccessToken, TokenProvider};
use sniper::marketplace::Marketplace;
use sniper::types::{AuthError, ListingSnapshot, MarketplaceError};

// ---------------------------------------------------------------------------
// Marketplace
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockMarketplace {
    active: Arc<Mutex<HashMap<String, Vec<ListingSnapshot>>>>,
    sold: Arc<Mutex<HashMap<String, Vec<Decimal>>>>,
    failing_term: Arc<Mutex<Option<String>>>,
    unauthorized: Arc<AtomicBool>,
    calls: Arc<Mutex<Vec<String>>>,
    bearers: Arc<Mutex<Vec<String>>>,
}

impl MockMarketplace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listings(&self, term: &str, listings: Vec<ListingSnapshot>) -> &Self {
        self.active.lock().unwrap().insert(term.to_string(), listings);
        self
    }

    pub fn with_sold(&self, title: &str, prices: Vec<Decimal>) -> &Self {
        self.sold.lock().unwrap().insert(title.to_string(), prices);
        self
    }

    /// Make the active search for `term` fail with a 500.
    pub fn fail_term(&self, term: &str) {
        *self.failing_term.lock().unwrap() = Some(term.to_string());
    }

    pub fn clear_failure(&self) {
        *self.failing_term.lock().unwrap() = None;
    }

    /// Reject every call with 401 until cleared.
    pub fn set_unauthorized(&self, on: bool) {
        self.unauthorized.store(on, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
        self.bearers.lock().unwrap().clear();
    }

    /// Terms searched, in order.
    pub fn active_terms(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("active:").map(String::from))
            .collect()
    }

    pub fn sold_lookups(&self) -> usize {
        self.calls().iter().filter(|c| c.starts_with("sold:")).count()
    }

    pub fn bearers(&self) -> Vec<String> {
        self.bearers.lock().unwrap().clone()
    }
}

#[async_trait]
impl Marketplace for MockMarketplace {
    async fn search_active_auctions(
        &self,
        term: &str,
        token: &AccessToken,
    ) -> Result<Vec<ListingSnapshot>, MarketplaceError> {
        self.calls.lock().unwrap().push(format!("active:{term}"));
        self.bearers.lock().unwrap().push(token.bearer().to_string());

        if self.unauthorized.load(Ordering::SeqCst) {
            return Err(MarketplaceError::Unauthorized);
        }
        if self.failing_term.lock().unwrap().as_deref() == Some(term) {
            return Err(MarketplaceError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(self
            .active
            .lock()
            .unwrap()
            .get(term)
            .cloned()
            .unwrap_or_default())
    }

    async fn search_sold_comparables(
        &self,
        title: &str,
        token: &AccessToken,
    ) -> Result<Vec<Decimal>, MarketplaceError> {
        self.calls.lock().unwrap().push(format!("sold:{title}"));
        self.bearers.lock().unwrap().push(token.bearer().to_string());

        if self.unauthorized.load(Ordering::SeqCst) {
            return Err(MarketplaceError::Unauthorized);
        }
        Ok(self
            .sold
            .lock()
            .unwrap()
            .get(title)
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn name(&self) -> &str {
        "recording"
    }
}

// ---------------------------------------------------------------------------
// Token provider
// ---------------------------------------------------------------------------

/// Issues `token-1`, `token-2`, ... and counts exchanges.
#[derive(Clone, Default)]
pub struct CountingTokenProvider {
    issued: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl CountingTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }
}

#[async_trait]
impl TokenProvider for CountingTokenProvider {
    async fn acquire(&self) -> Result<AccessToken, AuthError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::Rejected {
                status: 401,
                body: "invalid_client".to_string(),
            });
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(AccessToken::new(format!("token-{n}"), Some(7200)))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn listing(title: &str, id: u32, price: Decimal) -> ListingSnapshot {
    ListingSnapshot::new(title, format!("https://www.ebay.co.uk/itm/{id}"), price)
}
