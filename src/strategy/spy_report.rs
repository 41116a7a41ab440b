use chrono::NaiveDate;
use serde::Serialize;

use crate::config::SpyConfig;
use crate::domain::Bar;
use crate::strategy::spy_analysis::{
    options_metrics, prepare_records, sma_signals, weekday_stats, OptionsMetrics,
    SmaSignalSummary, WeekdayStats,
};
use crate::strategy::spy_backtest::{BacktestSummary, SpyBacktester};

/// Everything the SPY analyzer produces in one run
#[derive(Debug, Clone, Serialize)]
pub struct SpyReport {
    pub symbol: String,
    pub data_start: Option<NaiveDate>,
    pub data_end: Option<NaiveDate>,
    pub trading_days: usize,
    pub weekday_stats: Vec<WeekdayStats>,
    pub sma_signals: SmaSignalSummary,
    pub options_metrics: OptionsMetrics,
    pub backtest_start: NaiveDate,
    pub backtest: BacktestSummary,
}

impl SpyReport {
    /// Run every analysis stage over daily bars
    pub fn build(bars: &[Bar], config: &SpyConfig, backtest_start: NaiveDate) -> Self {
        let records = prepare_records(bars);
        let backtest = SpyBacktester::new(config.clone()).run(&records, backtest_start);

        Self {
            symbol: config.symbol.clone(),
            data_start: records.first().map(|r| r.date),
            data_end: records.last().map(|r| r.date),
            trading_days: records.len(),
            weekday_stats: weekday_stats(&records, &config.trading_days),
            sma_signals: sma_signals(&records),
            options_metrics: options_metrics(&records, config),
            backtest_start,
            backtest,
        }
    }
}
