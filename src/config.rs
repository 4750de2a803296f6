//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API client id/secret, webhook URL) are referenced by env-var
//! name in the config and resolved at runtime via `std::env::var`.
//! Every section has defaults, so a missing key falls back to the values
//! the scanner has always shipped with.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::types::Thresholds;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub marketplace: MarketplaceConfig,
    pub strategy: StrategyConfig,
    pub alerts: AlertsConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,
    /// Pause between full scan cycles.
    pub scan_interval_secs: u64,
    /// Pause after a failed cycle, before scanning again.
    pub recovery_cooldown_secs: u64,
    /// Maximum age of an access token before the supervisor renews it.
    pub token_refresh_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "SNIPER-001".to_string(),
            scan_interval_secs: 420,
            recovery_cooldown_secs: 120,
            token_refresh_secs: 7000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MarketplaceConfig {
    pub auth_url: String,
    pub api_base_url: String,
    pub scope: String,
    /// Value of the `X-EBAY-C-MARKETPLACE-ID` header.
    pub marketplace_id: String,
    pub client_id_env: String,
    pub client_secret_env: String,
    pub request_timeout_secs: u64,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            auth_url: "https://api.ebay.com/identity/v1/oauth2/token".to_string(),
            api_base_url: "https://api.ebay.com/buy/browse/v1".to_string(),
            scope: "https://api.ebay.com/oauth/api_scope".to_string(),
            marketplace_id: "EBAY_GB".to_string(),
            client_id_env: "EBAY_CLIENT_ID".to_string(),
            client_secret_env: "EBAY_CLIENT_SECRET".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StrategyConfig {
    /// Minimum `estimate - price` for a listing to be alerted.
    pub min_profit: Decimal,
    /// Listings priced above this are never considered.
    pub max_price: Decimal,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            min_profit: dec!(40),
            max_price: dec!(300),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AlertsConfig {
    /// Env var holding the webhook URL. Alerts go to the log when unset.
    pub webhook_url_env: Option<String>,
    pub currency_symbol: String,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            webhook_url_env: Some("DISCORD_WEBHOOK".to_string()),
            currency_symbol: "£".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub terms: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let terms = [
            // Cameras / lenses
            "canon lens auction",
            "sony lens auction",
            "nikon lens auction",
            "sigma lens auction",
            // Power tools
            "dewalt drill auction",
            "milwaukee tool auction",
            "makita drill auction",
            // Bundles / job lots
            "camera bundle auction",
            "tool bundle auction",
            "job lot electronics auction",
            "lego job lot auction",
            // Audio / music
            "dj equipment auction",
            "guitar bundle auction",
            "focusrite auction",
        ];
        Self {
            terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// Reject settings the scanner cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.search.terms.iter().all(|t| t.trim().is_empty()) {
            anyhow::bail!("search.terms must contain at least one non-empty term");
        }
        if self.strategy.min_profit < Decimal::ZERO {
            anyhow::bail!("strategy.min_profit must not be negative");
        }
        if self.strategy.max_price <= Decimal::ZERO {
            anyhow::bail!("strategy.max_price must be positive");
        }
        if self.agent.scan_interval_secs == 0
            || self.agent.recovery_cooldown_secs == 0
            || self.agent.token_refresh_secs == 0
        {
            anyhow::bail!("agent intervals must be greater than zero");
        }
        if self.marketplace.request_timeout_secs == 0 {
            anyhow::bail!("marketplace.request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_profit: self.strategy.min_profit,
            max_price: self.strategy.max_price,
        }
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.agent.scan_interval_secs)
    }

    pub fn recovery_cooldown(&self) -> Duration {
        Duration::from_secs(self.agent.recovery_cooldown_secs)
    }

    pub fn token_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.agent.token_refresh_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.marketplace.request_timeout_secs)
    }
}
