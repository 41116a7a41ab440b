//! SPY options day-trading analysis
//!
//! Derives daily returns, moving averages, RSI and realized volatility from
//! daily bars, then summarizes:
//! - performance by weekday (Monday and Wednesday are the preferred days)
//! - SMA5 counter-trend credit-spread signals and their hit rates
//! - options metrics used to size strikes for a target delta

use chrono::{NaiveDate, NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tracing::{debug, info};

use crate::config::SpyConfig;
use crate::domain::{Bar, BarColumns};
use crate::strategy::indicators::{
    annualized_volatility, pct_change, rsi, sma, TRADING_DAYS_PER_YEAR,
};

/// Rolling window for realized volatility
pub const VOLATILITY_WINDOW: usize = 20;
const RSI_PERIOD: usize = 14;

/// Weekdays the strategy trades, in reporting order
pub const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// One fully-defined trading day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub open: f64,
    pub close: f64,
    pub returns: f64,
    pub sma5: f64,
    pub sma10: f64,
    pub rsi: f64,
    /// Annualized 20-day realized volatility
    pub volatility: f64,
}

impl DailyRecord {
    /// Counter-trend spread suggested by the open relative to SMA5
    pub fn signal(&self) -> Option<SpreadKind> {
        SpreadKind::from_open(self.open, self.sma5)
    }

    /// Daily implied-volatility proxy
    pub fn iv_estimate(&self) -> f64 {
        self.volatility / TRADING_DAYS_PER_YEAR.sqrt()
    }

    /// Approximate strike distance for a target delta
    pub fn strike_distance(&self, target_delta: f64) -> f64 {
        self.close * self.iv_estimate() * target_delta
    }
}

/// Build records from bars, dropping every row with an undefined field
pub fn prepare_records(bars: &[Bar]) -> Vec<DailyRecord> {
    let cols = BarColumns::from_bars(bars);
    let returns = pct_change(&cols.close);
    let sma5 = sma(&cols.close, 5);
    let sma10 = sma(&cols.close, 10);
    let rsi14 = rsi(&cols.close, RSI_PERIOD);
    let vol = annualized_volatility(&returns, VOLATILITY_WINDOW);

    let records: Vec<DailyRecord> = bars
        .iter()
        .enumerate()
        .filter_map(|(i, bar)| {
            Some(DailyRecord {
                date: bar.date(),
                weekday: bar.weekday(),
                open: bar.open,
                close: bar.close,
                returns: returns[i]?,
                sma5: sma5[i]?,
                sma10: sma10[i]?,
                rsi: rsi14[i]?,
                volatility: vol[i]?,
            })
        })
        .collect();

    info!(
        "Prepared {} trading days of data from {} bars",
        records.len(),
        bars.len()
    );
    records
}

// =============================================================================
// Weekday statistics
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayStats {
    pub weekday: Weekday,
    pub avg_return: f64,
    /// Sample standard deviation; undefined with fewer than two days
    pub std_dev: Option<f64>,
    pub count: usize,
    pub avg_volatility: f64,
    pub optimal: bool,
}

#[derive(Debug, Clone, Tabled)]
pub struct WeekdayRow {
    #[tabled(rename = "")]
    pub marker: &'static str,
    #[tabled(rename = "Day")]
    pub day: String,
    #[tabled(rename = "Avg Return")]
    pub avg_return: String,
    #[tabled(rename = "Std Dev")]
    pub std_dev: String,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Avg Vol")]
    pub avg_volatility: String,
}

impl From<&WeekdayStats> for WeekdayRow {
    fn from(s: &WeekdayStats) -> Self {
        Self {
            marker: if s.optimal { "★" } else { "" },
            day: s.weekday.to_string(),
            avg_return: format!("{:.4}", s.avg_return),
            std_dev: s
                .std_dev
                .map(|v| format!("{v:.4}"))
                .unwrap_or_else(|| "-".to_string()),
            count: s.count,
            avg_volatility: format!("{:.4}", s.avg_volatility),
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Per-weekday return and volatility profile; weekdays with no data are omitted
pub fn weekday_stats(records: &[DailyRecord], optimal_days: &[Weekday]) -> Vec<WeekdayStats> {
    WEEKDAYS
        .iter()
        .filter_map(|&day| {
            let returns: Vec<f64> = records
                .iter()
                .filter(|r| r.weekday == day)
                .map(|r| r.returns)
                .collect();
            let vols: Vec<f64> = records
                .iter()
                .filter(|r| r.weekday == day)
                .map(|r| r.volatility)
                .collect();
            Some(WeekdayStats {
                weekday: day,
                avg_return: mean(&returns)?,
                std_dev: sample_std(&returns),
                count: returns.len(),
                avg_volatility: mean(&vols)?,
                optimal: optimal_days.contains(&day),
            })
        })
        .collect()
}

// =============================================================================
// SMA5 counter-trend signals
// =============================================================================

/// Credit spread chosen against the short-term trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpreadKind {
    /// Open above SMA5: sell calls (bearish)
    ShortCallSpread,
    /// Open below SMA5: sell puts (bullish)
    ShortPutSpread,
}

impl SpreadKind {
    pub fn from_open(open: f64, sma5: f64) -> Option<Self> {
        if open > sma5 {
            Some(SpreadKind::ShortCallSpread)
        } else if open < sma5 {
            Some(SpreadKind::ShortPutSpread)
        } else {
            None
        }
    }

    /// A bearish spread wins on a down day, a bullish one on an up day
    pub fn wins_on(&self, daily_return: f64) -> bool {
        match self {
            SpreadKind::ShortCallSpread => daily_return < 0.0,
            SpreadKind::ShortPutSpread => daily_return > 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpreadKind::ShortCallSpread => "Short_Call_Spread",
            SpreadKind::ShortPutSpread => "Short_Put_Spread",
        }
    }
}

impl std::fmt::Display for SpreadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalSideStats {
    pub days: usize,
    pub win_rate: Option<f64>,
    pub avg_return: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SmaSignalSummary {
    pub short_call: SignalSideStats,
    pub short_put: SignalSideStats,
}

fn side_stats(records: &[DailyRecord], kind: SpreadKind) -> SignalSideStats {
    let returns: Vec<f64> = records
        .iter()
        .filter(|r| r.signal() == Some(kind))
        .map(|r| r.returns)
        .collect();
    let wins = returns.iter().filter(|r| kind.wins_on(**r)).count();
    SignalSideStats {
        days: returns.len(),
        win_rate: if returns.is_empty() {
            None
        } else {
            Some(wins as f64 / returns.len() as f64)
        },
        avg_return: mean(&returns),
    }
}

/// Hit rates of the SMA5 counter-trend rule over the whole history
pub fn sma_signals(records: &[DailyRecord]) -> SmaSignalSummary {
    let summary = SmaSignalSummary {
        short_call: side_stats(records, SpreadKind::ShortCallSpread),
        short_put: side_stats(records, SpreadKind::ShortPutSpread),
    };
    debug!(
        "SMA5 signals: short_call_days={} short_put_days={}",
        summary.short_call.days, summary.short_put.days
    );
    summary
}

// =============================================================================
// Options metrics
// =============================================================================

/// Win rate of iron butterflies from the reference trade study
pub const IRON_BUTTERFLY_WIN_RATE: f64 = 0.6676;
/// Win rate of iron condors from the reference trade study
pub const IRON_CONDOR_WIN_RATE: f64 = 0.7019;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionsMetrics {
    pub target_delta: f64,
    /// Eastern time
    pub entry_time: NaiveTime,
    /// Eastern time
    pub exit_time: NaiveTime,
    pub hold_hours: f64,
    pub profit_target: Decimal,
    pub stop_loss: Decimal,
    pub iron_butterfly_win_rate: f64,
    pub iron_condor_win_rate: f64,
    /// IV proxy on the latest record
    pub latest_iv_estimate: Option<f64>,
    /// Strike distance on the latest record
    pub latest_strike_distance: Option<f64>,
}

pub fn entry_time() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 15, 0).unwrap_or(NaiveTime::MIN)
}

pub fn exit_time() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Latest-hour cutoff for any open position (Eastern time)
pub fn hard_close_time() -> NaiveTime {
    NaiveTime::from_hms_opt(15, 50, 0).unwrap_or(NaiveTime::MIN)
}

pub fn options_metrics(records: &[DailyRecord], config: &SpyConfig) -> OptionsMetrics {
    let latest = records.last();
    OptionsMetrics {
        target_delta: config.target_delta,
        entry_time: entry_time(),
        exit_time: exit_time(),
        hold_hours: 1.75,
        profit_target: config.profit_target,
        stop_loss: config.stop_loss,
        iron_butterfly_win_rate: IRON_BUTTERFLY_WIN_RATE,
        iron_condor_win_rate: IRON_CONDOR_WIN_RATE,
        latest_iv_estimate: latest.map(|r| r.iv_estimate()),
        latest_strike_distance: latest.map(|r| r.strike_distance(config.target_delta)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::trading_bars;

    #[test]
    fn test_prepare_records_drops_warmup() {
        let bars = trading_bars(60);
        let records = prepare_records(&bars);
        // Volatility needs 20 returns, and the first return is undefined.
        assert_eq!(records.len(), 60 - VOLATILITY_WINDOW);
        assert_eq!(records[0].date, bars[VOLATILITY_WINDOW].date());
        assert!(records.iter().all(|r| r.volatility > 0.0));
    }

    #[test]
    fn test_prepare_records_short_history_is_empty() {
        assert!(prepare_records(&trading_bars(10)).is_empty());
    }

    #[test]
    fn test_weekday_stats_marks_optimal_days() {
        let records = prepare_records(&trading_bars(120));
        let stats = weekday_stats(&records, &[Weekday::Mon, Weekday::Wed]);
        assert_eq!(stats.len(), 5);
        assert_eq!(stats[0].weekday, Weekday::Mon);
        assert!(stats[0].optimal);
        assert!(!stats[1].optimal);
        assert!(stats[2].optimal);
        let total: usize = stats.iter().map(|s| s.count).sum();
        assert_eq!(total, records.len());
        let row = WeekdayRow::from(&stats[0]);
        assert_eq!(row.marker, "★");
        assert_eq!(row.day, "Mon");
    }

    #[test]
    fn test_spread_kind_rules() {
        assert_eq!(SpreadKind::from_open(101.0, 100.0), Some(SpreadKind::ShortCallSpread));
        assert_eq!(SpreadKind::from_open(99.0, 100.0), Some(SpreadKind::ShortPutSpread));
        assert_eq!(SpreadKind::from_open(100.0, 100.0), None);
        assert!(SpreadKind::ShortCallSpread.wins_on(-0.01));
        assert!(!SpreadKind::ShortCallSpread.wins_on(0.0));
        assert!(SpreadKind::ShortPutSpread.wins_on(0.01));
    }

    #[test]
    fn test_sma_signals_partition_days() {
        let records = prepare_records(&trading_bars(120));
        let summary = sma_signals(&records);
        let signalled = records.iter().filter(|r| r.signal().is_some()).count();
        assert_eq!(summary.short_call.days + summary.short_put.days, signalled);
        if let Some(rate) = summary.short_call.win_rate {
            assert!((0.0..=1.0).contains(&rate));
        }
        assert_eq!(sma_signals(&[]).short_put.win_rate, None);
    }

    #[test]
    fn test_strike_distance() {
        let record = DailyRecord {
            date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            weekday: Weekday::Mon,
            open: 500.0,
            close: 500.0,
            returns: 0.0,
            sma5: 499.0,
            sma10: 498.0,
            rsi: 55.0,
            volatility: 0.16,
        };
        let iv = record.iv_estimate();
        assert!((record.strike_distance(0.275) - 500.0 * iv * 0.275).abs() < 1e-9);

        let metrics = options_metrics(&[record], &SpyConfig::default());
        assert_eq!(metrics.entry_time, NaiveTime::from_hms_opt(10, 15, 0).unwrap());
        assert_eq!(metrics.exit_time, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(metrics.target_delta, 0.275);
        assert!(metrics.latest_strike_distance.is_some());
    }
}
