use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::IndicatorParams;
use crate::domain::Bar;
use crate::error::Result;
use crate::strategy::signal::Analysis;

/// Source of historical daily bars
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Most recent history for a relative range (e.g., "1y") at an interval (e.g., "1d")
    async fn fetch_history(&self, ticker: &str, range: &str, interval: &str) -> Result<Vec<Bar>>;

    /// History between two dates, start inclusive, end exclusive
    async fn fetch_between(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: &str,
    ) -> Result<Vec<Bar>>;
}

/// Destination for buy-signal alerts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_analysis(
        &self,
        ticker: &str,
        analysis: &Analysis,
        params: &IndicatorParams,
    ) -> Result<()>;
}
