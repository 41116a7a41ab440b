//! Yahoo chart client against a local mock server

use chrono::NaiveDate;
use serde_json::json;
use stock_alerter::config::DataConfig;
use stock_alerter::{AlerterError, MarketDataSource, YahooClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> YahooClient {
    let config = DataConfig {
        yahoo_base_url: server.uri(),
        ..DataConfig::default()
    };
    YahooClient::new(&config).unwrap()
}

fn chart_body() -> serde_json::Value {
    // Out of order, with one null row
    json!({
        "chart": {
            "result": [{
                "meta": {"symbol": "AAPL"},
                "timestamp": [1717594200, 1717421400, 1717507800],
                "indicators": {
                    "quote": [{
                        "open": [195.0, 192.9, null],
                        "high": [196.5, 194.99, null],
                        "low": [194.2, 192.52, null],
                        "close": [196.0, 194.03, null],
                        "volume": [54156800, 50080500, null]
                    }]
                }
            }],
            "error": null
        }
    })
}

#[tokio::test]
async fn fetch_history_parses_and_sorts_bars() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .and(query_param("range", "1y"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(1)
        .mount(&server)
        .await;

    let bars = client_for(&server)
        .fetch_history("AAPL", "1y", "1d")
        .await
        .unwrap();

    assert_eq!(bars.len(), 2);
    assert!(bars[0].timestamp < bars[1].timestamp);
    assert_eq!(bars[0].close, 194.03);
    assert_eq!(bars[1].volume, 54_156_800);
}

#[tokio::test]
async fn chart_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/ZZZZ"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_history("ZZZZ", "1y", "1d")
        .await
        .unwrap_err();

    match err {
        AlerterError::MarketDataUnavailable(msg) => {
            assert!(msg.contains("ZZZZ"));
            assert!(msg.contains("symbol may be delisted"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_result_is_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/EMPTY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {
                "result": [{"timestamp": [], "indicators": {"quote": [{}]}}],
                "error": null
            }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_history("EMPTY", "1y", "1d")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No data found for EMPTY"));
}

#[tokio::test]
async fn fetch_between_sends_unix_period() {
    let server = MockServer::start().await;
    // 2024-06-01 and 2024-06-08 at midnight UTC
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/SPY"))
        .and(query_param("period1", "1717200000"))
        .and(query_param("period2", "1717804800"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(1)
        .mount(&server)
        .await;

    let bars = client_for(&server)
        .fetch_between(
            "SPY",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 8).unwrap(),
            "1d",
        )
        .await
        .unwrap();
    assert_eq!(bars.len(), 2);
}

#[tokio::test]
async fn index_symbol_is_percent_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/%5EGSPC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(1)
        .mount(&server)
        .await;

    let bars = client_for(&server)
        .fetch_history("^GSPC", "1y", "1d")
        .await
        .unwrap();
    assert_eq!(bars.len(), 2);
}
