//! Simulated backtest of the SMA5 counter-trend credit-spread rule
//!
//! Trades only on the configured weekdays. Each trade resolves at the profit
//! target or the stop loss with a win probability reduced by realized
//! volatility. The RNG is seedable so runs are reproducible.

use chrono::{NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tracing::{debug, info};

use crate::config::SpyConfig;
use crate::strategy::spy_analysis::{DailyRecord, SpreadKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeOutcome {
    Win,
    Loss,
}

/// One simulated 0DTE credit-spread trade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedTrade {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub strategy: SpreadKind,
    pub spy_price: f64,
    pub outcome: TradeOutcome,
    /// Fraction of premium collected
    pub pnl_pct: Decimal,
    pub volatility: f64,
    pub win_probability: f64,
    /// Whether the underlying actually moved the way the spread needed
    pub direction_correct: bool,
}

#[derive(Debug, Clone, Tabled)]
pub struct TradeRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Day")]
    pub day: String,
    #[tabled(rename = "Strategy")]
    pub strategy: String,
    #[tabled(rename = "SPY")]
    pub spy_price: String,
    #[tabled(rename = "Outcome")]
    pub outcome: String,
    #[tabled(rename = "PnL")]
    pub pnl: String,
}

impl From<&SimulatedTrade> for TradeRow {
    fn from(t: &SimulatedTrade) -> Self {
        Self {
            date: t.date.to_string(),
            day: t.weekday.to_string(),
            strategy: t.strategy.to_string(),
            spy_price: format!("{:.2}", t.spy_price),
            outcome: format!("{:?}", t.outcome),
            pnl: format!("{:.2}%", t.pnl_pct * Decimal::from(100)),
        }
    }
}

/// Aggregate results of one backtest run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// Requested first day of the backtest
    pub period_start: Option<NaiveDate>,
    /// Last day of history inside the backtest window
    pub period_end: Option<NaiveDate>,
    /// First trade date
    pub start: Option<NaiveDate>,
    /// Last trade date
    pub end: Option<NaiveDate>,
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub avg_win: Option<Decimal>,
    pub avg_loss: Option<Decimal>,
    /// Sum of per-trade returns
    pub total_return: Decimal,
    pub avg_trade_return: Decimal,
    /// Mean over standard deviation of per-trade returns
    pub return_risk_ratio: Option<f64>,
    /// Largest peak-to-trough fall of the cumulative return, in return units
    pub max_drawdown: Decimal,
    pub equity_curve: Vec<(NaiveDate, Decimal)>,
    pub trades: Vec<SimulatedTrade>,
}

impl BacktestSummary {
    pub fn is_empty(&self) -> bool {
        self.total_trades == 0
    }

    /// Short multi-line summary for terminal output
    pub fn report(&self) -> String {
        if self.is_empty() {
            return "No trades generated in backtest period".to_string();
        }
        let pct = |d: Decimal| format!("{:.2}%", d * Decimal::from(100));
        let mut lines = vec![
            format!(
                "Backtest Period: {} to {}",
                self.period_start
                    .or(self.start)
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                self.period_end
                    .or(self.end)
                    .map(|d| d.to_string())
                    .unwrap_or_default()
            ),
            format!("Total Trades: {}", self.total_trades),
            format!("Win Rate: {:.2}%", self.win_rate * 100.0),
            format!("Average Win: {}", self.avg_win.map(pct).unwrap_or_else(|| "-".into())),
            format!("Average Loss: {}", self.avg_loss.map(pct).unwrap_or_else(|| "-".into())),
            format!("Total Return: {}", pct(self.total_return)),
            format!("Average Return per Trade: {}", pct(self.avg_trade_return)),
            format!("Max Drawdown: {}", pct(self.max_drawdown)),
        ];
        if let Some(ratio) = self.return_risk_ratio {
            lines.push(format!("Return/Risk Ratio: {:.2}", ratio));
        }
        lines.join("\n")
    }
}

pub struct SpyBacktester {
    config: SpyConfig,
    rng: StdRng,
}

impl SpyBacktester {
    pub fn new(config: SpyConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    /// Win probability after the volatility haircut
    pub fn win_probability(&self, volatility: f64) -> f64 {
        let penalty = (volatility * self.config.volatility_penalty)
            .min(self.config.max_volatility_penalty)
            .max(0.0);
        (self.config.base_win_rate - penalty).clamp(0.0, 1.0)
    }

    /// Simulate trades on every eligible record on or after `start`
    pub fn run(&mut self, records: &[DailyRecord], start: NaiveDate) -> BacktestSummary {
        let mut trades = Vec::new();
        let mut period_end = None;

        for record in records.iter().filter(|r| r.date >= start) {
            period_end = Some(record.date);
            if !self.config.trading_days.contains(&record.weekday) {
                continue;
            }
            let Some(strategy) = record.signal() else {
                continue;
            };

            let win_probability = self.win_probability(record.volatility);
            let (outcome, pnl_pct) = if self.rng.gen::<f64>() < win_probability {
                (TradeOutcome::Win, self.config.profit_target)
            } else {
                (TradeOutcome::Loss, self.config.stop_loss)
            };

            trades.push(SimulatedTrade {
                date: record.date,
                weekday: record.weekday,
                strategy,
                spy_price: record.close,
                outcome,
                pnl_pct,
                volatility: record.volatility,
                win_probability,
                direction_correct: strategy.wins_on(record.returns),
            });
        }

        debug!("Simulated {} trades since {}", trades.len(), start);
        let mut summary = summarize(trades);
        summary.period_start = Some(start);
        summary.period_end = period_end;
        if !summary.is_empty() {
            info!(
                "Backtest: {} trades, win rate {:.2}%, total return {}",
                summary.total_trades,
                summary.win_rate * 100.0,
                summary.total_return
            );
        }
        summary
    }
}

fn summarize(trades: Vec<SimulatedTrade>) -> BacktestSummary {
    if trades.is_empty() {
        return BacktestSummary::default();
    }

    let total = trades.len();
    let wins: Vec<Decimal> = trades
        .iter()
        .filter(|t| t.outcome == TradeOutcome::Win)
        .map(|t| t.pnl_pct)
        .collect();
    let losses: Vec<Decimal> = trades
        .iter()
        .filter(|t| t.outcome == TradeOutcome::Loss)
        .map(|t| t.pnl_pct)
        .collect();

    let avg = |v: &[Decimal]| {
        if v.is_empty() {
            None
        } else {
            Some(v.iter().sum::<Decimal>() / Decimal::from(v.len()))
        }
    };

    let total_return: Decimal = trades.iter().map(|t| t.pnl_pct).sum();
    let avg_trade_return = total_return / Decimal::from(total);

    // Cumulative return curve and drawdown
    let mut equity = Decimal::ZERO;
    let mut peak = Decimal::ZERO;
    let mut max_drawdown = Decimal::ZERO;
    let mut equity_curve = Vec::with_capacity(total);
    for t in &trades {
        equity += t.pnl_pct;
        if equity > peak {
            peak = equity;
        }
        max_drawdown = max_drawdown.max(peak - equity);
        equity_curve.push((t.date, equity));
    }

    // Sample std of returns (n - 1)
    let returns: Vec<f64> = trades.iter().filter_map(|t| t.pnl_pct.to_f64()).collect();
    let return_risk_ratio = if returns.len() > 1 {
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let variance =
            returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (returns.len() - 1) as f64;
        let std_dev = variance.sqrt();
        (std_dev > 0.0).then(|| mean / std_dev)
    } else {
        None
    };

    BacktestSummary {
        period_start: None,
        period_end: None,
        start: trades.first().map(|t| t.date),
        end: trades.last().map(|t| t.date),
        total_trades: total,
        wins: wins.len(),
        losses: losses.len(),
        win_rate: wins.len() as f64 / total as f64,
        avg_win: avg(&wins),
        avg_loss: avg(&losses),
        total_return,
        avg_trade_return,
        return_risk_ratio,
        max_drawdown,
        equity_curve,
        trades,
    }
}
