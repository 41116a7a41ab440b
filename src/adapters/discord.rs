//! Discord webhook notifications
//!
//! Posts buy-signal alerts as a single embed.

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::adapters::traits::Notifier;
use crate::config::IndicatorParams;
use crate::error::{AlerterError, Result};
use crate::strategy::signal::Analysis;

/// Embed color for a BUY
pub const COLOR_BUY: u32 = 65280;
/// Embed color for a HOLD
pub const COLOR_HOLD: u32 = 16711680;

/// Discord notification client
#[derive(Clone)]
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookPayload {
    pub content: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub footer: EmbedFooter,
}

#[derive(Debug, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "True"
    } else {
        "False"
    }
}

/// Build the webhook body for one ticker
pub fn build_payload(
    ticker: &str,
    analysis: &Analysis,
    params: &IndicatorParams,
    at: NaiveDateTime,
) -> WebhookPayload {
    let status = if analysis.overall_buy {
        "✅ BUY SIGNAL! ✅"
    } else {
        "❌ HOLD ❌"
    };
    let color = if analysis.overall_buy {
        COLOR_BUY
    } else {
        COLOR_HOLD
    };

    let mut lines = vec![
        format!("**Current Price:** ${:.2}", analysis.price),
        "--- Indicator Details ---".to_string(),
    ];
    for row in analysis.conditions(params) {
        lines.push(format!(
            "- **{}**: {} ({}: {})",
            row.condition,
            yes_no(row.met),
            row.label,
            row.value
        ));
    }

    WebhookPayload {
        content: format!("**{} Daily Chart Analysis:** {}", ticker, status),
        embeds: vec![Embed {
            title: format!("📈 Stock Analysis for {} 📈", ticker),
            description: lines.join("\n"),
            color,
            footer: EmbedFooter {
                text: format!("Analysis Date: {}", at.format("%Y-%m-%d %H:%M:%S")),
            },
        }],
    }
}

impl DiscordNotifier {
    /// Create a notifier; a blank URL is a configuration error
    pub fn new(webhook_url: &str) -> Result<Self> {
        let webhook_url = webhook_url.trim();
        if webhook_url.is_empty() {
            return Err(AlerterError::MissingConfig(
                "Discord webhook URL is empty".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            webhook_url: webhook_url.to_string(),
        })
    }

    /// Post a prepared payload
    pub async fn send_payload(&self, payload: &WebhookPayload) -> Result<()> {
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await?;

        if resp.status().is_success() {
            debug!("Discord notification sent successfully");
            Ok(())
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!("Discord notification failed: {} - {}", status, body);
            Err(AlerterError::Notification(format!("HTTP {}: {}", status, body)))
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send_analysis(
        &self,
        ticker: &str,
        analysis: &Analysis,
        params: &IndicatorParams,
    ) -> Result<()> {
        let payload = build_payload(ticker, analysis, params, Local::now().naive_local());
        self.send_payload(&payload).await?;
        info!("Discord alert sent successfully for {}", ticker);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(overall_buy: bool) -> Analysis {
        Analysis {
            price: 187.456,
            ema35: 180.0,
            ema50: 178.25,
            ema200: 170.1,
            rsi: Some(27.5),
            kc_lower: 188.0,
            macd_line: 1.2,
            signal_line: 1.0,
            macd_hist: 0.2,
            price_over_ema35: true,
            price_over_ema50: true,
            price_over_ema200: true,
            rsi_in_buy_range: true,
            kc_in_buy_range: true,
            macd_bullish_crossover: overall_buy,
            overall_buy,
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(10, 0, 5)
            .unwrap()
    }

    #[test]
    fn test_buy_payload() {
        let payload = build_payload("AAPL", &sample(true), &IndicatorParams::default(), at());
        assert_eq!(payload.content, "**AAPL Daily Chart Analysis:** ✅ BUY SIGNAL! ✅");
        let embed = &payload.embeds[0];
        assert_eq!(embed.title, "📈 Stock Analysis for AAPL 📈");
        assert_eq!(embed.color, COLOR_BUY);
        assert_eq!(embed.footer.text, "Analysis Date: 2025-06-02 10:00:05");

        let lines: Vec<&str> = embed.description.lines().collect();
        assert_eq!(lines[0], "**Current Price:** $187.46");
        assert_eq!(lines[1], "--- Indicator Details ---");
        assert_eq!(lines[2], "- **Price > EMA 35**: True (EMA 35: 180.00)");
        assert_eq!(lines[5], "- **RSI < 30**: True (RSI: 27.50)");
        assert_eq!(lines[7], "- **MACD Bullish Crossover**: True (MACD Hist: 0.20)");
    }

    #[test]
    fn test_hold_payload_is_red() {
        let payload = build_payload("MSFT", &sample(false), &IndicatorParams::default(), at());
        assert!(payload.content.ends_with("❌ HOLD ❌"));
        assert_eq!(payload.embeds[0].color, COLOR_HOLD);
    }

    #[test]
    fn test_payload_json_shape() {
        let payload = build_payload("GOOGL", &sample(true), &IndicatorParams::default(), at());
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["content"].is_string());
        assert_eq!(json["embeds"][0]["color"], 65280);
        assert!(json["embeds"][0]["footer"]["text"].is_string());
    }

    #[test]
    fn test_blank_url_rejected() {
        assert!(matches!(
            DiscordNotifier::new("  "),
            Err(AlerterError::MissingConfig(_))
        ));
    }
}
