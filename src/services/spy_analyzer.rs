//! SPY options analyzer: fetch daily history and build the full report

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::adapters::MarketDataSource;
use crate::config::SpyConfig;
use crate::error::{AlerterError, Result};
use crate::strategy::spy_analysis::VOLATILITY_WINDOW;
use crate::strategy::spy_report::SpyReport;

pub struct SpyAnalyzer {
    source: Arc<dyn MarketDataSource>,
    config: SpyConfig,
}

impl SpyAnalyzer {
    pub fn new(source: Arc<dyn MarketDataSource>, config: SpyConfig) -> Self {
        Self { source, config }
    }

    /// Fetch `[start, end)` of daily bars and run every analysis stage
    pub async fn run(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        backtest_start: NaiveDate,
    ) -> Result<SpyReport> {
        if backtest_start < start {
            return Err(AlerterError::Validation(format!(
                "backtest start {} is before data start {}",
                backtest_start, start
            )));
        }

        info!(
            "Fetching {} data from {} to {}...",
            self.config.symbol, start, end
        );
        let bars = self
            .source
            .fetch_between(&self.config.symbol, start, end, "1d")
            .await?;
        info!("Fetched {} trading days of {} data", bars.len(), self.config.symbol);

        let report = SpyReport::build(&bars, &self.config, backtest_start);
        if report.trading_days == 0 {
            return Err(AlerterError::InsufficientData {
                ticker: self.config.symbol.clone(),
                needed: VOLATILITY_WINDOW + 1,
                got: bars.len(),
            });
        }
        if report.backtest.is_empty() {
            warn!("No trades generated in backtest period");
        }
        Ok(report)
    }
}
