//! Strategy module
//!
//! Pure computations over daily bars.
//!
//! - `indicators` / `signal` - technical indicators and the multi-condition buy signal
//! - `spy_*` / `trading_plan` - SPY 0DTE credit-spread analysis and simulated backtest

// =============================================================================
// Buy-signal scanner
// =============================================================================

pub mod indicators;
pub mod signal;

pub use signal::{analyze, Analysis, ConditionRow};

// =============================================================================
// SPY options analyzer
// =============================================================================

pub mod spy_analysis;
pub mod spy_backtest;
pub mod spy_report;
pub mod trading_plan;

pub use spy_analysis::{DailyRecord, SpreadKind};
pub use spy_backtest::{BacktestSummary, SimulatedTrade, SpyBacktester, TradeOutcome};
pub use spy_report::SpyReport;
pub use trading_plan::TradingPlan;

#[cfg(test)]
pub(crate) mod test_support;
