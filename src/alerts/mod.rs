//! Alert delivery.
//!
//! Alerts are fire-and-forget: a failed delivery is logged and otherwise
//! ignored, and the scanner never learns whether a message arrived.

pub mod discord;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use crate::types::Opportunity;

pub use discord::DiscordWebhook;

/// Best-effort delivery of a text message to an external channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str);

    /// Channel name for logging.
    fn name(&self) -> &str;
}

/// Fallback used when no webhook is configured: alerts go to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) {
        info!(message = %message.trim(), "Alert (no webhook configured)");
    }

    fn name(&self) -> &str {
        "log"
    }
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Render the alert text for an opportunity.
pub fn format_alert(opp: &Opportunity, currency: &str) -> String {
    format!(
        "\n🚨 **AUCTION SNIPER HIT**\n\n\
         {title}\n\n\
         Current Bid: {currency}{price}\n\
         Est Resale: {currency}{estimate}\n\n\
         🔥 Profit: {currency}{profit}\n\n\
         {link}\n",
        title = opp.listing.title,
        price = money(opp.listing.current_price),
        estimate = money(opp.estimate),
        profit = money(opp.profit),
        link = opp.listing.link,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use crate::types::ListingSnapshot;

    fn opportunity(price: Decimal, estimate: Decimal) -> Opportunity {
        Opportunity {
            listing: ListingSnapshot::new("Sigma 18-35mm Art", "https://ebay.co.uk/itm/42", price),
            estimate,
            profit: estimate - price,
            detected_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_alert_contents() {
        let msg = format_alert(&opportunity(dec!(50), dec!(100)), "£");

        assert!(msg.contains("AUCTION SNIPER HIT"));
        assert!(msg.contains("Sigma 18-35mm Art"));
        assert!(msg.contains("Current Bid: £50.00"));
        assert!(msg.contains("Est Resale: £100.00"));
        assert!(msg.contains("Profit: £50.00"));
        assert!(msg.contains("https://ebay.co.uk/itm/42"));
    }

    #[test]
    fn test_format_alert_rounds_to_pennies() {
        let msg = format_alert(&opportunity(dec!(20), dec!(70.3333333)), "£");
        assert!(msg.contains("Est Resale: £70.33"));
        assert!(msg.contains("Profit: £50.33"));
    }

    #[test]
    fn test_format_alert_currency_symbol() {
        let msg = format_alert(&opportunity(dec!(10), dec!(60)), "$");
        assert!(msg.contains("Profit: $50.00"));
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        let notifier = LogNotifier;
        notifier.notify("hello").await;
        assert_eq!(notifier.name(), "log");
    }
}
