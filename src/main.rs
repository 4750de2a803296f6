//! SNIPER — unattended auction-arbitrage scanner.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! obtains the first marketplace token, and hands control to the
//! supervisor loop until Ctrl+C.

use anyhow::{Context, Result};
use secrecy::SecretString;
use tracing::{info, warn};

use sniper::alerts::{DiscordWebhook, LogNotifier, Notifier};
use sniper::auth::{CredentialManager, EbayAuthClient};
use sniper::config::AppConfig;
use sniper::engine::scanner::OpportunityScanner;
use sniper::engine::supervisor::Supervisor;
use sniper::marketplace::ebay::EbayClient;

const BANNER: &str = r#"
 ____  _   _ ___ ____  _____ ____
/ ___|| \ | |_ _|  _ \| ____|  _ \
\___ \|  \| || || |_) |  _| | |_) |
 ___) | |\  || ||  __/| |___|  _ <
|____/|_| \_|___|_|   |_____|_| \_\

  Auction intelligence, v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load("config.toml")?;

    init_logging();

    println!("{BANNER}");
    info!(
        agent_name = %cfg.agent.name,
        scan_interval_secs = cfg.agent.scan_interval_secs,
        min_profit = %cfg.strategy.min_profit,
        max_price = %cfg.strategy.max_price,
        terms = cfg.search.terms.len(),
        "🚀 AUCTION INTELLIGENCE BOT LIVE"
    );

    // -- Initialise components -------------------------------------------

    let client_id = AppConfig::resolve_env(&cfg.marketplace.client_id_env)?;
    let client_secret = SecretString::new(AppConfig::resolve_env(&cfg.marketplace.client_secret_env)?);

    let auth = EbayAuthClient::new(
        cfg.marketplace.auth_url.clone(),
        cfg.marketplace.scope.clone(),
        client_id,
        client_secret,
        cfg.request_timeout(),
    )?;
    let credentials = CredentialManager::new(Box::new(auth), cfg.token_refresh_interval());

    let marketplace = EbayClient::new(
        cfg.marketplace.api_base_url.clone(),
        cfg.marketplace.marketplace_id.clone(),
        cfg.request_timeout(),
    )?;

    let webhook = cfg
        .alerts
        .webhook_url_env
        .as_deref()
        .and_then(|env| std::env::var(env).ok())
        .filter(|url| !url.is_empty());

    let notifier: Box<dyn Notifier> = match webhook {
        Some(url) => {
            info!("Discord alerts enabled");
            Box::new(DiscordWebhook::new(SecretString::new(url), cfg.request_timeout())?)
        }
        None => {
            warn!("No webhook configured — alerts will only be logged");
            Box::new(LogNotifier)
        }
    };

    let scanner = OpportunityScanner::new(
        cfg.search.terms.clone(),
        cfg.thresholds(),
        cfg.alerts.currency_symbol.clone(),
    );

    let mut supervisor = Supervisor::new(
        credentials,
        scanner,
        Box::new(marketplace),
        notifier,
        cfg.scan_interval(),
        cfg.recovery_cooldown(),
    );

    // -- Main loop -------------------------------------------------------

    supervisor
        .start()
        .await
        .context("Initial marketplace authentication failed")?;

    info!(
        interval_secs = cfg.agent.scan_interval_secs,
        "Entering main loop. Press Ctrl+C to stop."
    );

    supervisor
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl+C, running until killed");
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!(
        cycles = supervisor.cycles_run(),
        alerted = supervisor.scanner().ledger().len(),
        "SNIPER shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sniper=info"));

    let json_logging = std::env::var("SNIPER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
