//! Stock alerter CLI
//!
//! Commands:
//! - `stock-alerter scan` - Daily buy-signal scan with Discord alerts (default)
//! - `stock-alerter analyze` - Print the indicator checklist for one ticker
//! - `stock-alerter spy` - SPY options day-trading analysis and backtest
//! - `stock-alerter plan` - Print the SPY trading plan

pub mod commands;
pub mod output;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Daily technical-analysis stock alerter
#[derive(Parser, Debug)]
#[command(name = "stock-alerter")]
#[command(author, version, about = "Daily stock buy-signal scanner with Discord alerts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory
    #[arg(short, long, global = true, default_value = "config")]
    pub config: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Scan tickers and alert on BUY signals
    Scan {
        /// Comma-separated tickers (overrides config)
        #[arg(short, long, value_delimiter = ',')]
        tickers: Vec<String>,
        /// Log alerts instead of posting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Analyze one ticker without alerting
    Analyze {
        ticker: String,
        #[arg(long)]
        json: bool,
    },

    /// SPY options day-trading analysis
    Spy {
        /// First day of history (defaults to config)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// First day of the simulated backtest (defaults to config)
        #[arg(long)]
        backtest_start: Option<NaiveDate>,
        /// RNG seed for a reproducible backtest
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        json: bool,
    },

    /// Print the SPY trading plan
    Plan,
}

impl Cli {
    /// No subcommand runs the daily scan with configured tickers
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Scan {
            tickers: Vec::new(),
            dry_run: false,
        })
    }
}
