use thiserror::Error;

/// Main error type for the alerter
#[derive(Error, Debug)]
pub enum AlerterError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Market data errors
    #[error("Market data unavailable: {0}")]
    MarketDataUnavailable(String),

    #[error("Invalid market data: {0}")]
    InvalidMarketData(String),

    #[error("Insufficient data for {ticker}: need {needed} bars, got {got}")]
    InsufficientData {
        ticker: String,
        needed: usize,
        got: usize,
    },

    // Alert delivery errors
    #[error("Notification failed: {0}")]
    Notification(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for AlerterError
pub type Result<T> = std::result::Result<T, AlerterError>;
