//! Yahoo Finance chart API client
//!
//! Fetches daily OHLCV history from the public (unofficial) v8 chart endpoint.
//! Data is delayed and intended for personal use.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::adapters::traits::MarketDataSource;
use crate::config::DataConfig;
use crate::domain::Bar;
use crate::error::{AlerterError, Result};

/// Yahoo Finance API client
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl ChartError {
    fn describe(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(desc)) => format!("{}: {}", code, desc),
            (Some(code), None) => code.clone(),
            (None, Some(desc)) => desc.clone(),
            (None, None) => "unknown chart error".to_string(),
        }
    }
}

impl YahooClient {
    pub fn new(config: &DataConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.yahoo_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_chart(&self, ticker: &str, query: &[(&str, String)]) -> Result<Vec<Bar>> {
        let url = chart_url(&self.base_url, ticker);
        debug!("Fetching chart: {} {:?}", url, query);

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let envelope: Option<ChartEnvelope> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let detail = envelope
                .and_then(|e| e.chart.error)
                .map(|e| e.describe())
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(AlerterError::MarketDataUnavailable(format!(
                "{}: HTTP {} ({})",
                ticker, status, detail
            )));
        }

        let envelope = envelope.ok_or_else(|| {
            AlerterError::InvalidMarketData(format!("{}: unparseable chart response", ticker))
        })?;

        if let Some(err) = envelope.chart.error {
            return Err(AlerterError::MarketDataUnavailable(format!(
                "{}: {}",
                ticker,
                err.describe()
            )));
        }

        let result = envelope
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| {
                AlerterError::MarketDataUnavailable(format!("{}: no chart result", ticker))
            })?;

        let bars = parse_bars(result);
        if bars.is_empty() {
            return Err(AlerterError::MarketDataUnavailable(format!(
                "No data found for {}",
                ticker
            )));
        }

        debug!("Fetched {} bars for {}", bars.len(), ticker);
        Ok(bars)
    }
}

/// Chart endpoint with the ticker percent-encoded as one path segment
fn chart_url(base_url: &str, ticker: &str) -> String {
    format!("{}/v8/finance/chart/{}", base_url, urlencoding::encode(ticker))
}

/// Zip the column arrays into bars, skipping rows with any missing price
fn parse_bars(result: ChartResult) -> Vec<Bar> {
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut skipped = 0usize;
    let mut bars: Vec<Bar> = Vec::with_capacity(result.timestamp.len());

    for (i, ts) in result.timestamp.iter().enumerate() {
        let column = |c: &Vec<Option<f64>>| c.get(i).copied().flatten();
        let row = (
            DateTime::from_timestamp(*ts, 0),
            column(&quote.open),
            column(&quote.high),
            column(&quote.low),
            column(&quote.close),
        );
        match row {
            (Some(timestamp), Some(open), Some(high), Some(low), Some(close)) => bars.push(Bar {
                timestamp,
                open,
                high,
                low,
                close,
                volume: column(&quote.volume).map(|v| v.max(0.0) as u64).unwrap_or(0),
            }),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {} incomplete chart rows", skipped);
    }

    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);
    bars
}

#[async_trait]
impl MarketDataSource for YahooClient {
    async fn fetch_history(&self, ticker: &str, range: &str, interval: &str) -> Result<Vec<Bar>> {
        self.fetch_chart(
            ticker,
            &[
                ("range", range.to_string()),
                ("interval", interval.to_string()),
            ],
        )
        .await
    }

    async fn fetch_between(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: &str,
    ) -> Result<Vec<Bar>> {
        if end <= start {
            return Err(AlerterError::Validation(format!(
                "end date {} must be after start date {}",
                end, start
            )));
        }
        let to_secs = |d: NaiveDate| d.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();

        self.fetch_chart(
            ticker,
            &[
                ("period1", to_secs(start).to_string()),
                ("period2", to_secs(end).to_string()),
                ("interval", interval.to_string()),
            ],
        )
        .await
    }
}
