//! Marketplace credentials.
//!
//! The Browse API wants an OAuth2 application token obtained through the
//! client-credentials grant:
//!
//! `POST https://api.ebay.com/identity/v1/oauth2/token`
//! with `Authorization: Basic base64(client_id:client_secret)` and a form body
//! `grant_type=client_credentials&scope=https://api.ebay.com/oauth/api_scope`.
//!
//! Tokens live for about two hours. Nothing renews them in the background:
//! the supervisor asks [`CredentialManager`] for a refresh between cycles,
//! and unconditionally after a failed cycle.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::types::AuthError;

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// Bearer credential for marketplace calls.
///
/// Owned by the [`CredentialManager`]; everything else only borrows it for
/// the duration of a single request.
#[derive(Debug)]
pub struct AccessToken {
    secret: SecretString,
    /// Lifetime reported by the auth server, if any.
    pub expires_in: Option<u64>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_in: Option<u64>) -> Self {
        Self {
            secret: SecretString::new(token.into()),
            expires_in,
        }
    }

    /// Raw token value, for the `Authorization` header only.
    pub fn bearer(&self) -> &str {
        self.secret.expose_secret()
    }
}

/// Anything that can mint a fresh access token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn acquire(&self) -> Result<AccessToken, AuthError>;
}

// ---------------------------------------------------------------------------
// eBay OAuth client
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Client-credentials exchange against the eBay identity endpoint.
pub struct EbayAuthClient {
    http: Client,
    auth_url: String,
    scope: String,
    client_id: String,
    client_secret: SecretString,
}

impl EbayAuthClient {
    pub fn new(
        auth_url: String,
        scope: String,
        client_id: String,
        client_secret: SecretString,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("SNIPER/0.1.0 (auction-scanner)")
            .build()
            .context("Failed to build HTTP client for eBay auth")?;

        Ok(Self {
            http,
            auth_url,
            scope,
            client_id,
            client_secret,
        })
    }

    fn parse_token(body: &str) -> Result<AccessToken, AuthError> {
        let parsed: TokenResponse =
            serde_json::from_str(body).map_err(|e| AuthError::Malformed(e.to_string()))?;

        debug!(token_type = ?parsed.token_type, "Token response parsed");

        match parsed.access_token {
            Some(token) if !token.is_empty() => Ok(AccessToken::new(token, parsed.expires_in)),
            _ => Err(AuthError::Malformed(
                "response contained no access_token".to_string(),
            )),
        }
    }
}

#[async_trait]
impl TokenProvider for EbayAuthClient {
    async fn acquire(&self) -> Result<AccessToken, AuthError> {
        info!("Requesting eBay application token...");

        let resp = self
            .http
            .post(&self.auth_url)
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .form(&[
                ("grant_type", "client_credentials"),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await
            .map_err(AuthError::Request)?;

        let status = resp.status();
        let body = resp.text().await.map_err(AuthError::Request)?;

        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token = Self::parse_token(&body)?;
        info!(expires_in = ?token.expires_in, "eBay token acquired");
        Ok(token)
    }
}

// ---------------------------------------------------------------------------
// Credential manager
// ---------------------------------------------------------------------------

/// Holds the current access token and knows when it is due for renewal.
pub struct CredentialManager {
    provider: Box<dyn TokenProvider>,
    refresh_interval: Duration,
    token: Option<AccessToken>,
    last_refresh: Option<Instant>,
}

impl CredentialManager {
    pub fn new(provider: Box<dyn TokenProvider>, refresh_interval: Duration) -> Self {
        Self {
            provider,
            refresh_interval,
            token: None,
            last_refresh: None,
        }
    }

    /// Exchange credentials for a new token and make it current.
    ///
    /// On failure the previous token (if any) stays in place.
    pub async fn acquire(&mut self) -> Result<&AccessToken, AuthError> {
        let token = match self.provider.acquire().await {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "Token acquisition failed");
                return Err(e);
            }
        };
        self.last_refresh = Some(Instant::now());
        Ok(&*self.token.insert(token))
    }

    /// True once more than the refresh interval has elapsed since `last_refresh`.
    pub fn is_stale(&self, last_refresh: Instant, now: Instant) -> bool {
        now.saturating_duration_since(last_refresh) > self.refresh_interval
    }

    /// Renew the token if it is missing or stale. Returns whether a refresh happened.
    pub async fn refresh_if_stale(&mut self, now: Instant) -> Result<bool, AuthError> {
        let due = match (self.token.as_ref(), self.last_refresh) {
            (Some(_), Some(last)) => self.is_stale(last, now),
            _ => true,
        };
        if !due {
            return Ok(false);
        }
        debug!("Access token stale, refreshing");
        self.acquire().await?;
        Ok(true)
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
