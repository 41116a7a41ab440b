//! Discord notifier against a local mock server

use stock_alerter::config::IndicatorParams;
use stock_alerter::strategy::Analysis;
use stock_alerter::{AlerterError, DiscordNotifier, Notifier};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn buy_analysis() -> Analysis {
    Analysis {
        price: 210.5,
        ema35: 200.0,
        ema50: 198.0,
        ema200: 180.0,
        rsi: Some(28.0),
        kc_lower: 211.0,
        macd_line: 0.8,
        signal_line: 0.6,
        macd_hist: 0.2,
        price_over_ema35: true,
        price_over_ema50: true,
        price_over_ema200: true,
        rsi_in_buy_range: true,
        kc_in_buy_range: true,
        macd_bullish_crossover: true,
        overall_buy: true,
    }
}

#[tokio::test]
async fn posts_embed_for_buy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/webhooks/1/token"))
        .and(body_partial_json(serde_json::json!({
            "content": "**NVDA Daily Chart Analysis:** ✅ BUY SIGNAL! ✅",
            "embeds": [{
                "title": "📈 Stock Analysis for NVDA 📈",
                "color": 65280
            }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = DiscordNotifier::new(&format!("{}/api/webhooks/1/token", server.uri())).unwrap();
    notifier
        .send_analysis("NVDA", &buy_analysis(), &IndicatorParams::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn server_error_is_notification_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = DiscordNotifier::new(&server.uri()).unwrap();
    let err = notifier
        .send_analysis("NVDA", &buy_analysis(), &IndicatorParams::default())
        .await
        .unwrap_err();

    match err {
        AlerterError::Notification(msg) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("boom"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
