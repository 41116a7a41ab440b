pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod strategy;

pub use adapters::{DiscordNotifier, MarketDataSource, Notifier, YahooClient};
pub use config::AppConfig;
pub use error::{AlerterError, Result};
pub use services::{Scanner, ScanReport, SpyAnalyzer, TickerOutcome};
