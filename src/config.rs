use chrono::{NaiveDate, Weekday};
use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the Discord webhook secret
pub const WEBHOOK_ENV_VAR: &str = "DISCORD_WEBHOOK_URL";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub indicators: IndicatorParams,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub spy: SpyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Tickers to monitor on every scan
    pub tickers: Vec<String>,
    /// Yahoo range for history (e.g., "1y")
    #[serde(default = "default_range")]
    pub range: String,
    /// Bar interval (e.g., "1d")
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Pause between ticker fetches in milliseconds
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,
}

fn default_range() -> String {
    "1y".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_request_delay() -> u64 {
    250
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tickers: vec!["AAPL".to_string(), "MSFT".to_string(), "GOOGL".to_string()],
            range: default_range(),
            interval: default_interval(),
            request_delay_ms: default_request_delay(),
        }
    }
}

/// Indicator lengths and thresholds (Pine Script defaults where applicable)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub ema_short_len: usize,
    pub ema_mid_len: usize,
    pub ema_long_len: usize,
    pub rsi_len: usize,
    /// RSI below this value counts as the buying range
    pub rsi_buy_threshold: f64,
    pub kc_len: usize,
    pub kc_multiplier: f64,
    pub kc_atr_len: usize,
    pub macd_fast_len: usize,
    pub macd_slow_len: usize,
    pub macd_signal_len: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_short_len: 35,
            ema_mid_len: 50,
            ema_long_len: 200,
            rsi_len: 14,
            rsi_buy_threshold: 30.0,
            kc_len: 20,
            kc_multiplier: 2.0,
            kc_atr_len: 10,
            macd_fast_len: 12,
            macd_slow_len: 26,
            macd_signal_len: 9,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Base URL of the Yahoo chart API
    pub yahoo_base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AlertConfig {
    /// Discord webhook URL; falls back to DISCORD_WEBHOOK_URL
    pub webhook_url: Option<String>,
    /// Log alerts instead of posting them
    pub dry_run: bool,
}

impl AlertConfig {
    /// Webhook URL if one is configured and non-empty
    pub fn webhook(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// SPY options analyzer and backtest parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SpyConfig {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub backtest_start: NaiveDate,
    /// Weekdays on which the backtest opens trades
    pub trading_days: Vec<Weekday>,
    pub target_delta: f64,
    /// Win: fraction of premium collected (e.g., 0.15 = 15%)
    pub profit_target: Decimal,
    /// Loss: fraction of premium collected (e.g., -0.25 = -25%)
    pub stop_loss: Decimal,
    pub base_win_rate: f64,
    /// Win-rate haircut per unit of annualized volatility
    pub volatility_penalty: f64,
    /// Upper bound on the volatility haircut
    pub max_volatility_penalty: f64,
    /// RNG seed for reproducible backtests (random when unset)
    pub seed: Option<u64>,
}

impl Default for SpyConfig {
    fn default() -> Self {
        Self {
            symbol: "SPY".to_string(),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            backtest_start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            trading_days: vec![Weekday::Mon, Weekday::Wed],
            target_delta: 0.275,
            profit_target: dec!(0.15),
            stop_loss: dec!(-0.25),
            base_win_rate: 0.75,
            volatility_penalty: 0.1,
            max_volatility_penalty: 0.1,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a directory, then the environment
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("alerts.dry_run", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("ALERTER_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (ALERTER__SCAN__TICKERS, etc.)
            .add_source(
                Environment::with_prefix("ALERTER")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("scan.tickers"),
            );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        if config.alerts.webhook().is_none() {
            config.alerts.webhook_url = std::env::var(WEBHOOK_ENV_VAR).ok();
        }
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.scan.tickers.iter().all(|t| t.trim().is_empty()) {
            errors.push("scan.tickers must contain at least one ticker".to_string());
        }

        let p = &self.indicators;
        for (name, len) in [
            ("ema_short_len", p.ema_short_len),
            ("ema_mid_len", p.ema_mid_len),
            ("ema_long_len", p.ema_long_len),
            ("rsi_len", p.rsi_len),
            ("kc_len", p.kc_len),
            ("kc_atr_len", p.kc_atr_len),
            ("macd_fast_len", p.macd_fast_len),
            ("macd_slow_len", p.macd_slow_len),
            ("macd_signal_len", p.macd_signal_len),
        ] {
            if len == 0 {
                errors.push(format!("indicators.{name} must be positive"));
            }
        }

        if p.macd_fast_len >= p.macd_slow_len {
            errors.push("indicators.macd_fast_len must be less than macd_slow_len".to_string());
        }

        if p.rsi_buy_threshold <= 0.0 || p.rsi_buy_threshold >= 100.0 {
            errors.push("indicators.rsi_buy_threshold must be between 0 and 100".to_string());
        }

        if p.kc_multiplier <= 0.0 {
            errors.push("indicators.kc_multiplier must be positive".to_string());
        }

        // SPY backtest params
        let s = &self.spy;
        if s.trading_days.is_empty() {
            errors.push("spy.trading_days must not be empty".to_string());
        }

        if s.profit_target <= Decimal::ZERO {
            errors.push("spy.profit_target must be positive".to_string());
        }

        if s.stop_loss >= Decimal::ZERO {
            errors.push("spy.stop_loss must be negative".to_string());
        }

        if s.base_win_rate <= 0.0 || s.base_win_rate > 1.0 {
            errors.push("spy.base_win_rate must be in (0, 1]".to_string());
        }

        if s.target_delta <= 0.0 || s.target_delta >= 1.0 {
            errors.push("spy.target_delta must be between 0 and 1".to_string());
        }

        if s.backtest_start < s.start_date {
            errors.push("spy.backtest_start must not precede spy.start_date".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
