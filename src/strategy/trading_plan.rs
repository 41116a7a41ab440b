//! Printable SPY 0DTE trading plan

use std::fmt;

use chrono::Weekday;
use rust_decimal::Decimal;

use crate::config::SpyConfig;
use crate::strategy::spy_analysis::{entry_time, exit_time, hard_close_time};
use crate::strategy::spy_backtest::BacktestSummary;

const RULE: &str = "============================================================";

fn day_name(day: &Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mondays",
        Weekday::Tue => "Tuesdays",
        Weekday::Wed => "Wednesdays",
        Weekday::Thu => "Thursdays",
        Weekday::Fri => "Fridays",
        Weekday::Sat => "Saturdays",
        Weekday::Sun => "Sundays",
    }
}

fn join_days(days: &[Weekday]) -> String {
    let names: Vec<&str> = days.iter().map(day_name).collect();
    match names.split_last() {
        None => String::new(),
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
    }
}

fn pct(d: Decimal) -> String {
    format!("{}%", (d * Decimal::from(100)).normalize())
}

/// Trading plan parameterized by the SPY strategy settings
#[derive(Debug, Clone)]
pub struct TradingPlan {
    config: SpyConfig,
}

impl TradingPlan {
    pub fn new(config: SpyConfig) -> Self {
        Self { config }
    }

    /// Trades per year implied by a backtest period
    pub fn trades_per_year(summary: &BacktestSummary) -> Option<f64> {
        let (start, end) = (summary.start?, summary.end?);
        let days = (end - start).num_days();
        if days <= 0 {
            return None;
        }
        Some(summary.total_trades as f64 * 365.25 / days as f64)
    }

    /// Render the plan; expected performance comes from `backtest` when present
    pub fn render(&self, backtest: Option<&BacktestSummary>) -> String {
        PlanView {
            plan: self,
            backtest,
        }
        .to_string()
    }
}

struct PlanView<'a> {
    plan: &'a TradingPlan,
    backtest: Option<&'a BacktestSummary>,
}

impl fmt::Display for PlanView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.plan.config;

        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "{} OPTIONS DAY TRADING STRATEGY - COMPREHENSIVE PLAN",
            c.symbol
        )?;
        writeln!(f, "{RULE}")?;

        writeln!(f, "\n🎯 STRATEGY OVERVIEW:")?;
        writeln!(f, "- Focus: {} options day trading on lower timeframes", c.symbol)?;
        writeln!(f, "- Primary approach: Counter-trend credit spreads with SMA filters")?;
        writeln!(f, "- Secondary approach: Neutral strategies (Iron Butterflies/Condors)")?;

        writeln!(f, "\n📅 OPTIMAL TRADING SCHEDULE:")?;
        writeln!(f, "• Trade ONLY on {}", join_days(&c.trading_days))?;
        writeln!(
            f,
            "• Entry time: {} AM ET (after morning volatility)",
            entry_time().format("%H:%M")
        )?;
        writeln!(
            f,
            "• Exit time: {} PM ET (before lunch lull)",
            exit_time().format("%H:%M")
        )?;
        writeln!(f, "• Average hold time: ~1.75 hours")?;

        writeln!(f, "\n📊 ENTRY CRITERIA:")?;
        writeln!(f, "1. Technical Setup:")?;
        writeln!(
            f,
            "   - If {} opens ABOVE 5-day SMA: Short Call Spread (bearish)",
            c.symbol
        )?;
        writeln!(
            f,
            "   - If {} opens BELOW 5-day SMA: Short Put Spread (bullish)",
            c.symbol
        )?;
        writeln!(f, "   - RSI consideration: Avoid extreme readings (>70 or <30)")?;

        writeln!(f, "\n2. Options Selection:")?;
        writeln!(f, "   - Target Delta: {:.3}", c.target_delta)?;
        writeln!(f, "   - Expiration: Same day (0DTE)")?;
        writeln!(f, "   - Strike selection: Based on current IV and price action")?;
        writeln!(f, "   - Avoid trading if IV Rank > 30%")?;

        writeln!(f, "\n💰 RISK MANAGEMENT:")?;
        writeln!(f, "• Profit Target: {} of premium collected", pct(c.profit_target))?;
        writeln!(f, "• Stop Loss: {} of premium collected", pct(c.stop_loss))?;
        writeln!(f, "• Maximum risk per trade: 1-2% of account")?;
        writeln!(
            f,
            "• Never hold positions past {} PM ET",
            hard_close_time().format("%-I:%M")
        )?;

        writeln!(f, "\n📈 EXPECTED PERFORMANCE:")?;
        match self.backtest.filter(|b| !b.is_empty()) {
            Some(b) => {
                writeln!(f, "• Win Rate: {:.1}%", b.win_rate * 100.0)?;
                writeln!(
                    f,
                    "• Average Return per Trade: {:.2}%",
                    b.avg_trade_return * Decimal::from(100)
                )?;
                if let Some(per_year) = TradingPlan::trades_per_year(b) {
                    writeln!(f, "• Total Trades per Year: ~{:.0}", per_year)?;
                }
            }
            None => {
                writeln!(f, "• Run the backtest to estimate performance")?;
            }
        }

        writeln!(f, "\n⚠️  RISK WARNINGS:")?;
        writeln!(f, "• 0DTE options are extremely risky and can result in 100% loss")?;
        writeln!(f, "• This strategy requires active monitoring during trading hours")?;
        writeln!(f, "• Past performance does not guarantee future results")?;
        writeln!(f, "• Options trading requires significant experience and capital")?;
        writeln!(f, "• Consider paper trading extensively before risking real money")?;

        writeln!(f, "\n🛠️  IMPLEMENTATION TOOLS:")?;
        writeln!(f, "• Platform: Interactive Brokers, TastyTrade, or similar")?;
        writeln!(f, "• Data: Real-time options chains and Greeks")?;
        writeln!(f, "• Monitoring: Set alerts for profit targets and stop losses")?;

        writeln!(f, "\n📚 CONTINUOUS IMPROVEMENT:")?;
        writeln!(f, "• Track all trades in a detailed journal")?;
        writeln!(f, "• Review performance weekly")?;
        writeln!(f, "• Adjust parameters based on market conditions")?;

        writeln!(f, "\n{RULE}")?;
        writeln!(f, "Remember: This is a high-risk, high-skill strategy.")?;
        writeln!(f, "Start small, stay disciplined, and always manage risk first.")?;
        write!(f, "{RULE}")
    }
}
