//! Run-once daily scan
//!
//! Fetches history for every configured ticker, evaluates the buy conditions
//! and posts an alert for each BUY. A failing ticker is logged and skipped.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::adapters::{MarketDataSource, Notifier};
use crate::config::{IndicatorParams, ScanConfig};
use crate::strategy::signal::{analyze, Analysis};

/// What happened to one ticker during a scan
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickerOutcome {
    /// Analyzed, no BUY
    Hold { analysis: Analysis },
    /// BUY and the alert was delivered (or logged in dry-run)
    Alerted { analysis: Analysis, dry_run: bool },
    /// BUY but delivery failed
    AlertFailed { analysis: Analysis, reason: String },
    /// No usable data or analysis failed
    Skipped { reason: String },
}

impl TickerOutcome {
    pub fn is_buy(&self) -> bool {
        matches!(
            self,
            TickerOutcome::Alerted { .. } | TickerOutcome::AlertFailed { .. }
        )
    }
}

/// Summary of a whole scan
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub analyzed: usize,
    pub skipped: usize,
    pub buy_signals: usize,
    pub alerts_sent: usize,
    /// BUY signals only logged because the scan was a dry run
    pub dry_run_alerts: usize,
    pub alerts_failed: usize,
    pub outcomes: Vec<(String, TickerOutcome)>,
}

impl ScanReport {
    fn record(&mut self, ticker: &str, outcome: TickerOutcome) {
        match &outcome {
            TickerOutcome::Hold { .. } => self.analyzed += 1,
            TickerOutcome::Alerted { dry_run, .. } => {
                self.analyzed += 1;
                self.buy_signals += 1;
                if *dry_run {
                    self.dry_run_alerts += 1;
                } else {
                    self.alerts_sent += 1;
                }
            }
            TickerOutcome::AlertFailed { .. } => {
                self.analyzed += 1;
                self.buy_signals += 1;
                self.alerts_failed += 1;
            }
            TickerOutcome::Skipped { .. } => self.skipped += 1,
        }
        self.outcomes.push((ticker.to_string(), outcome));
    }
}

/// Scans tickers and dispatches alerts
pub struct Scanner {
    source: Arc<dyn MarketDataSource>,
    notifier: Option<Arc<dyn Notifier>>,
    scan: ScanConfig,
    params: IndicatorParams,
}

impl Scanner {
    /// `notifier` may only be `None` for dry-run scans
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        notifier: Option<Arc<dyn Notifier>>,
        scan: ScanConfig,
        params: IndicatorParams,
    ) -> Self {
        Self {
            source,
            notifier,
            scan,
            params,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.notifier.is_none()
    }

    /// Scan every ticker sequentially
    pub async fn run(&self, tickers: &[String]) -> ScanReport {
        let mut report = ScanReport::default();

        for (i, ticker) in tickers.iter().enumerate() {
            if i > 0 && self.scan.request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.scan.request_delay_ms)).await;
            }
            let outcome = self.scan_ticker(ticker).await;
            report.record(ticker, outcome);
        }

        info!(
            "Scan complete: analyzed={} skipped={} buy_signals={} alerts_sent={} dry_run_alerts={} alerts_failed={}",
            report.analyzed,
            report.skipped,
            report.buy_signals,
            report.alerts_sent,
            report.dry_run_alerts,
            report.alerts_failed
        );
        report
    }

    /// Fetch, analyze and alert for one ticker
    pub async fn scan_ticker(&self, ticker: &str) -> TickerOutcome {
        info!("Analyzing {}...", ticker);

        let bars = match self
            .source
            .fetch_history(ticker, &self.scan.range, &self.scan.interval)
            .await
        {
            Ok(bars) => bars,
            Err(e) => {
                warn!("Skipping analysis for {} due to no data: {}", ticker, e);
                return TickerOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };

        let analysis = match analyze(ticker, &bars, &self.params) {
            Ok(a) => a,
            Err(e) => {
                warn!("Could not perform analysis for {}: {}", ticker, e);
                return TickerOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };

        for (key, value) in analysis.fields() {
            info!(ticker = %ticker, "- {}: {}", key, value);
        }

        if !analysis.overall_buy {
            info!("{}: No Overall BUY Signal. Holding.", ticker);
            return TickerOutcome::Hold { analysis };
        }

        info!("{}: Overall BUY Signal detected!", ticker);

        let Some(notifier) = &self.notifier else {
            info!("[DRY RUN] Would send Discord alert for {}", ticker);
            return TickerOutcome::Alerted {
                analysis,
                dry_run: true,
            };
        };

        match notifier.send_analysis(ticker, &analysis, &self.params).await {
            Ok(()) => TickerOutcome::Alerted {
                analysis,
                dry_run: false,
            },
            Err(e) => {
                error!("Failed to send Discord alert for {}: {}", ticker, e);
                TickerOutcome::AlertFailed {
                    analysis,
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::traits::{MockMarketDataSource, MockNotifier};
    use crate::domain::Bar;
    use crate::error::AlerterError;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                timestamp: start + ChronoDuration::days(i as i64),
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: 1,
            })
            .collect()
    }

    /// Params loose enough that a long uptrend with a final bounce reads as BUY
    fn permissive_params() -> IndicatorParams {
        IndicatorParams {
            rsi_buy_threshold: 99.9,
            kc_multiplier: -50.0,
            ..IndicatorParams::default()
        }
    }

    fn scan_config() -> ScanConfig {
        ScanConfig {
            request_delay_ms: 0,
            ..ScanConfig::default()
        }
    }

    fn buy_series() -> Vec<f64> {
        // Rise, then a short dip pushes MACD under signal, then a sharp bounce crosses back.
        let mut closes: Vec<f64> = (0..250).map(|i| 100.0 + i as f64).collect();
        for _ in 0..8 {
            let last = closes[closes.len() - 1];
            closes.push(last - 3.0);
        }
        let last = closes[closes.len() - 1];
        closes.push(last + 80.0);
        closes
    }

    #[tokio::test]
    async fn test_fetch_failure_is_skipped() {
        let mut source = MockMarketDataSource::new();
        source.expect_fetch_history().returning(|ticker, _, _| {
            Err(AlerterError::MarketDataUnavailable(format!(
                "No data found for {ticker}"
            )))
        });
        let mut notifier = MockNotifier::new();
        notifier.expect_send_analysis().never();

        let scanner = Scanner::new(
            Arc::new(source),
            Some(Arc::new(notifier)),
            scan_config(),
            IndicatorParams::default(),
        );
        let report = scanner.run(&["ZZZZ".to_string()]).await;
        assert_eq!(report.skipped, 1);
        assert_eq!(report.analyzed, 0);
        assert!(matches!(report.outcomes[0].1, TickerOutcome::Skipped { .. }));
    }

    #[tokio::test]
    async fn test_hold_does_not_notify() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_fetch_history()
            .returning(|_, _, _| Ok(bars(&[10.0; 60])));
        let mut notifier = MockNotifier::new();
        notifier.expect_send_analysis().never();

        let scanner = Scanner::new(
            Arc::new(source),
            Some(Arc::new(notifier)),
            scan_config(),
            IndicatorParams::default(),
        );
        let report = scanner.run(&["AAPL".to_string(), "MSFT".to_string()]).await;
        assert_eq!(report.analyzed, 2);
        assert_eq!(report.buy_signals, 0);
    }

    #[tokio::test]
    async fn test_buy_notifies_once_per_ticker() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_fetch_history()
            .returning(|_, _, _| Ok(bars(&buy_series())));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_analysis()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let scanner = Scanner::new(
            Arc::new(source),
            Some(Arc::new(notifier)),
            scan_config(),
            permissive_params(),
        );
        let report = scanner.run(&["NVDA".to_string()]).await;
        assert_eq!(report.buy_signals, 1);
        assert_eq!(report.alerts_sent, 1);
        assert!(report.outcomes[0].1.is_buy());
    }

    #[tokio::test]
    async fn test_notifier_failure_is_recorded() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_fetch_history()
            .returning(|_, _, _| Ok(bars(&buy_series())));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_analysis()
            .returning(|_, _, _| Err(AlerterError::Notification("HTTP 500".to_string())));

        let scanner = Scanner::new(
            Arc::new(source),
            Some(Arc::new(notifier)),
            scan_config(),
            permissive_params(),
        );
        let report = scanner.run(&["NVDA".to_string()]).await;
        assert_eq!(report.alerts_failed, 1);
        assert_eq!(report.alerts_sent, 0);
    }

    #[tokio::test]
    async fn test_dry_run_never_posts() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_fetch_history()
            .returning(|_, _, _| Ok(bars(&buy_series())));

        let scanner = Scanner::new(Arc::new(source), None, scan_config(), permissive_params());
        assert!(scanner.is_dry_run());
        let outcome = scanner.scan_ticker("NVDA").await;
        assert!(matches!(outcome, TickerOutcome::Alerted { dry_run: true, .. }));
    }

    #[tokio::test]
    async fn test_dry_run_alerts_are_not_counted_as_sent() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_fetch_history()
            .returning(|_, _, _| Ok(bars(&buy_series())));

        let scanner = Scanner::new(Arc::new(source), None, scan_config(), permissive_params());
        let report = scanner.run(&["NVDA".to_string(), "AMD".to_string()]).await;
        assert_eq!(report.buy_signals, 2);
        assert_eq!(report.dry_run_alerts, 2);
        assert_eq!(report.alerts_sent, 0);
    }
}
