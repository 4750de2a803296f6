//! Discord webhook delivery.
//!
//! `POST {webhook_url}` with `{"content": "<message>"}`. Discord caps
//! message content at 2000 characters; longer text is truncated.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::Notifier;

const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

pub struct DiscordWebhook {
    http: Client,
    url: SecretString,
}

impl DiscordWebhook {
    pub fn new(url: SecretString, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("SNIPER/0.1.0 (auction-scanner)")
            .build()
            .context("Failed to build HTTP client for Discord")?;

        Ok(Self { http, url })
    }

    fn clip(message: &str) -> &str {
        match message.char_indices().nth(MAX_CONTENT_CHARS) {
            Some((idx, _)) => &message[..idx],
            None => message,
        }
    }

    async fn send(&self, message: &str) -> Result<()> {
        let payload = WebhookPayload {
            content: Self::clip(message),
        };

        let resp = self
            .http
            .post(self.url.expose_secret())
            .json(&payload)
            .send()
            .await
            .context("Discord webhook request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Discord webhook error {status}: {body}");
        }

        debug!("Discord alert delivered");
        Ok(())
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn notify(&self, message: &str) {
        if let Err(e) = self.send(message).await {
            warn!(error = %e, "Alert delivery failed, dropping message");
        }
    }

    fn name(&self) -> &str {
        "discord"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = WebhookPayload { content: "hit" };
        assert_eq!(serde_json::to_string(&payload).unwrap(), r#"{"content":"hit"}"#);
    }

    #[test]
    fn test_clip_short_message_untouched() {
        assert_eq!(DiscordWebhook::clip("short"), "short");
    }

    #[test]
    fn test_clip_respects_char_boundaries() {
        let long = "🔥".repeat(MAX_CONTENT_CHARS + 10);
        let clipped = DiscordWebhook::clip(&long);
        assert_eq!(clipped.chars().count(), MAX_CONTENT_CHARS);
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_swallowed() {
        let hook = DiscordWebhook::new(
            SecretString::new("http://127.0.0.1:9/webhook".to_string()),
            Duration::from_millis(200),
        )
        .unwrap();
        // Must return without panicking or propagating.
        hook.notify("test").await;
    }
}
