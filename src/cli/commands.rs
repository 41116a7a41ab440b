//! Command handlers

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use tabled::Tabled;
use tracing::{info, warn};

use crate::adapters::{DiscordNotifier, MarketDataSource, Notifier, YahooClient};
use crate::cli::output::{print_items, print_json, print_kv, print_section, render_table, OutputMode};
use crate::config::{AppConfig, SpyConfig, WEBHOOK_ENV_VAR};
use crate::error::AlerterError;
use crate::services::{ScanReport, Scanner, SpyAnalyzer, TickerOutcome};
use crate::strategy::signal::analyze as analyze_bars;
use crate::strategy::spy_analysis::WeekdayRow;
use crate::strategy::spy_backtest::TradeRow;
use crate::strategy::{SpyReport, TradingPlan};

/// Tickers given on the command line win over configured ones
pub fn resolve_tickers(cli_tickers: &[String], config: &AppConfig) -> Vec<String> {
    let source = if cli_tickers.is_empty() {
        &config.scan.tickers
    } else {
        cli_tickers
    };
    source
        .iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Build the notifier for a scan; a live scan without a webhook is an error
pub fn build_notifier(config: &AppConfig, dry_run: bool) -> Result<Option<Arc<dyn Notifier>>> {
    if dry_run {
        return Ok(None);
    }
    let url = config.alerts.webhook().ok_or_else(|| {
        AlerterError::MissingConfig(format!(
            "Discord webhook URL not set (set {} or alerts.webhook_url)",
            WEBHOOK_ENV_VAR
        ))
    })?;
    Ok(Some(Arc::new(DiscordNotifier::new(url)?)))
}

pub async fn scan(config: &AppConfig, tickers: &[String], dry_run: bool) -> Result<ScanReport> {
    let dry_run = dry_run || config.alerts.dry_run;
    let notifier = build_notifier(config, dry_run)?;
    let source: Arc<dyn MarketDataSource> = Arc::new(YahooClient::new(&config.data)?);

    let tickers = resolve_tickers(tickers, config);
    info!(
        "Starting scan of {} tickers{}",
        tickers.len(),
        if dry_run { " (dry run)" } else { "" }
    );

    let scanner = Scanner::new(source, notifier, config.scan.clone(), config.indicators);
    let report = scanner.run(&tickers).await;

    for (ticker, outcome) in &report.outcomes {
        if let TickerOutcome::AlertFailed { reason, .. } = outcome {
            warn!("{}: alert not delivered: {}", ticker, reason);
        }
    }
    Ok(report)
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Indicator")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

pub async fn analyze(config: &AppConfig, ticker: &str, json: bool) -> Result<()> {
    let ticker = ticker.trim().to_uppercase();
    let source = YahooClient::new(&config.data)?;
    let bars = source
        .fetch_history(&ticker, &config.scan.range, &config.scan.interval)
        .await
        .with_context(|| format!("fetching history for {ticker}"))?;
    let analysis = analyze_bars(&ticker, &bars, &config.indicators)?;

    match OutputMode::from_json_flag(json) {
        OutputMode::Json => print_json(&analysis)?,
        OutputMode::Table => {
            let fields: Vec<FieldRow> = analysis
                .fields()
                .into_iter()
                .map(|(name, value)| FieldRow { name, value })
                .collect();
            println!("{}", render_table(&fields));
            println!();
            print_items(&analysis.conditions(&config.indicators), OutputMode::Table)?;
            print_kv(
                &format!("{ticker} overall"),
                if analysis.overall_buy { "BUY" } else { "HOLD" },
            );
        }
    }
    Ok(())
}

pub async fn spy(
    config: &AppConfig,
    start: Option<NaiveDate>,
    backtest_start: Option<NaiveDate>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut spy_config = config.spy.clone();
    if seed.is_some() {
        spy_config.seed = seed;
    }
    let start = start.unwrap_or(spy_config.start_date);
    let backtest_start = backtest_start.unwrap_or(spy_config.backtest_start);
    // End is exclusive; include today's bar if the session has one
    let end = Utc::now().date_naive() + Duration::days(1);

    let source: Arc<dyn MarketDataSource> = Arc::new(YahooClient::new(&config.data)?);
    let analyzer = SpyAnalyzer::new(source, spy_config.clone());
    let report = analyzer.run(start, end, backtest_start).await?;

    match OutputMode::from_json_flag(json) {
        OutputMode::Json => print_json(&report)?,
        OutputMode::Table => print_spy_report(&report, &spy_config),
    }
    Ok(())
}

fn print_spy_report(report: &SpyReport, spy_config: &SpyConfig) {
    println!("{} OPTIONS DAY TRADING STRATEGY ANALYZER", report.symbol);
    print_kv("Trading days", report.trading_days);
    if let (Some(first), Some(last)) = (report.data_start, report.data_end) {
        print_kv("Period", format!("{first} to {last}"));
    }

    print_section("OPTIMAL TRADING DAYS ANALYSIS");
    let rows: Vec<WeekdayRow> = report.weekday_stats.iter().map(WeekdayRow::from).collect();
    println!("{}", render_table(&rows));

    print_section("SMA COUNTER-TREND SIGNAL ANALYSIS");
    let pct = |v: Option<f64>| {
        v.map(|x| format!("{:.2}%", x * 100.0))
            .unwrap_or_else(|| "-".to_string())
    };
    let num = |v: Option<f64>| v.map(|x| format!("{x:.4}")).unwrap_or_else(|| "-".to_string());
    let s = &report.sma_signals;
    println!("Short Call Signal (when price > SMA5) - Counter-trend Bearish:");
    println!("  Days: {}", s.short_call.days);
    println!("  Win Rate: {}", pct(s.short_call.win_rate));
    println!("  Avg Return: {}", num(s.short_call.avg_return));
    println!("Short Put Signal (when price < SMA5) - Counter-trend Bullish:");
    println!("  Days: {}", s.short_put.days);
    println!("  Win Rate: {}", pct(s.short_put.win_rate));
    println!("  Avg Return: {}", num(s.short_put.avg_return));

    print_section("OPTIONS TRADING METRICS");
    let m = &report.options_metrics;
    print_kv("Optimal Entry Time", format!("{} AM ET", m.entry_time.format("%H:%M")));
    print_kv("Optimal Exit Time", format!("{} PM ET", m.exit_time.format("%H:%M")));
    print_kv("Optimal Hold Duration", format!("{} hours", m.hold_hours));
    print_kv("Target Delta", m.target_delta);
    print_kv("Iron Butterfly Win Rate", pct(Some(m.iron_butterfly_win_rate)));
    print_kv("Iron Condor Win Rate", pct(Some(m.iron_condor_win_rate)));
    if let Some(distance) = m.latest_strike_distance {
        print_kv("Latest Strike Distance", format!("{distance:.2}"));
    }

    print_section("STRATEGY BACKTEST");
    println!("{}", report.backtest.report());
    if !report.backtest.is_empty() {
        let recent: Vec<TradeRow> = report
            .backtest
            .trades
            .iter()
            .rev()
            .take(10)
            .rev()
            .map(TradeRow::from)
            .collect();
        println!("\nLast {} trades:", recent.len());
        println!("{}", render_table(&recent));
    }

    println!();
    println!(
        "{}",
        TradingPlan::new(spy_config.clone()).render(Some(&report.backtest))
    );
}

pub fn plan(config: &AppConfig) {
    println!("{}", TradingPlan::new(config.spy.clone()).render(None));
}
