//! Top-level control loop.
//!
//! ```text
//! STARTING ──► SCANNING ──ok──► SLEEPING (scan interval) ──► SCANNING ...
//!                  │
//!                  └──err──► RECOVERING (forced token refresh, cooldown) ──► SCANNING
//! ```
//!
//! A failure while STARTING is returned to the caller. Failures while
//! SCANNING are logged and never end the loop; only the shutdown future
//! passed to [`Supervisor::run_until`] does.

use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::alerts::Notifier;
use crate::auth::CredentialManager;
use crate::engine::scanner::OpportunityScanner;
use crate::marketplace::Marketplace;
use crate::types::{AuthError, CycleReport, SniperError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Starting,
    Scanning,
    Sleeping,
    Recovering,
}

pub struct Supervisor {
    credentials: CredentialManager,
    scanner: OpportunityScanner,
    marketplace: Box<dyn Marketplace>,
    notifier: Box<dyn Notifier>,
    scan_interval: Duration,
    recovery_cooldown: Duration,
    state: SupervisorState,
    cycle: u64,
}

impl Supervisor {
    pub fn new(
        credentials: CredentialManager,
        scanner: OpportunityScanner,
        marketplace: Box<dyn Marketplace>,
        notifier: Box<dyn Notifier>,
        scan_interval: Duration,
        recovery_cooldown: Duration,
    ) -> Self {
        Self {
            credentials,
            scanner,
            marketplace,
            notifier,
            scan_interval,
            recovery_cooldown,
            state: SupervisorState::Starting,
            cycle: 0,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycle
    }

    pub fn scanner(&self) -> &OpportunityScanner {
        &self.scanner
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    /// STARTING: obtain the first access token.
    pub async fn start(&mut self) -> Result<(), AuthError> {
        self.state = SupervisorState::Starting;
        self.credentials.acquire().await?;
        info!(
            marketplace = self.marketplace.name(),
            notifier = self.notifier.name(),
            terms = self.scanner.terms().len(),
            token_refresh_secs = self.credentials.refresh_interval().as_secs(),
            "Supervisor started"
        );
        self.state = SupervisorState::Scanning;
        Ok(())
    }

    /// Run one SCANNING pass and settle in SLEEPING or RECOVERING.
    ///
    /// Returns how long to wait before the next pass.
    pub async fn step(&mut self) -> Duration {
        self.state = SupervisorState::Scanning;

        match self.scan_once().await {
            Ok(report) => {
                log_cycle_report(&report, self.scanner.ledger().len());
                info!(secs = self.scan_interval.as_secs(), "Sleeping");
                self.state = SupervisorState::Sleeping;
                self.scan_interval
            }
            Err(e) => {
                self.recover(&e).await;
                self.recovery_cooldown
            }
        }
    }

    /// Drive the state machine until `shutdown` resolves.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let wait = self.step().await;
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = &mut shutdown => {
                    info!(cycles = self.cycle, "Shutdown requested, leaving main loop");
                    break;
                }
            }
        }
    }

    async fn scan_once(&mut self) -> Result<CycleReport, SniperError> {
        if self.credentials.refresh_if_stale(Instant::now()).await? {
            info!("Access token refreshed");
        }
        let token = self
            .credentials
            .token()
            .ok_or_else(|| AuthError::Malformed("no access token available".to_string()))?;

        self.cycle += 1;
        self.scanner
            .run_cycle(&*self.marketplace, &*self.notifier, token, self.cycle)
            .await
    }

    /// RECOVERING: log, force a token refresh, and let the caller cool down.
    async fn recover(&mut self, cause: &SniperError) {
        self.state = SupervisorState::Recovering;
        error!(
            error = %cause,
            auth_failure = cause.is_auth_failure(),
            cycle = self.cycle,
            cooldown_secs = self.recovery_cooldown.as_secs(),
            "Scan cycle failed, recovering"
        );

        if let Err(e) = self.credentials.acquire().await {
            warn!(error = %e, "Token refresh during recovery failed, keeping previous token");
        }
    }
}

/// Log a human-readable cycle summary.
fn log_cycle_report(report: &CycleReport, ledger_size: usize) {
    info!(
        cycle = report.cycle_number,
        terms = report.terms_scanned,
        listings = report.listings_seen,
        alerts = report.alerts.len(),
        skipped_seen = report.skipped_seen,
        skipped_price = report.skipped_price,
        skipped_no_estimate = report.skipped_no_estimate,
        below_threshold = report.below_threshold,
        ledger = ledger_size,
        "Cycle complete"
    );
}
