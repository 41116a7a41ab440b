//! Buy-condition evaluation on daily bars
//!
//! Computes every indicator over the full history and checks the latest bar
//! against the trend, momentum and band conditions. A BUY needs all of them.

use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tracing::debug;

use crate::config::IndicatorParams;
use crate::domain::{Bar, BarColumns};
use crate::error::{AlerterError, Result};
use crate::strategy::indicators::{ema, keltner, macd, rsi};

/// Minimum bars required: the crossover check reads the previous bar
pub const MIN_BARS: usize = 2;

/// Latest indicator values and the conditions derived from them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub price: f64,
    pub ema35: f64,
    pub ema50: f64,
    pub ema200: f64,
    /// Undefined when the lookback has no price movement or too few bars
    pub rsi: Option<f64>,
    pub kc_lower: f64,
    pub macd_line: f64,
    pub signal_line: f64,
    pub macd_hist: f64,
    pub price_over_ema35: bool,
    pub price_over_ema50: bool,
    pub price_over_ema200: bool,
    pub rsi_in_buy_range: bool,
    pub kc_in_buy_range: bool,
    pub macd_bullish_crossover: bool,
    pub overall_buy: bool,
}

/// One labelled row of the condition checklist
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ConditionRow {
    pub condition: String,
    pub met: bool,
    pub label: String,
    pub value: String,
}

fn fmt_value(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "NaN".to_string())
}

impl Analysis {
    /// Human-readable checklist, in alert order
    pub fn conditions(&self, params: &IndicatorParams) -> Vec<ConditionRow> {
        let row = |condition: String, met: bool, label: String, value: Option<f64>| ConditionRow {
            condition,
            met,
            label,
            value: fmt_value(value),
        };
        vec![
            row(
                format!("Price > EMA {}", params.ema_short_len),
                self.price_over_ema35,
                format!("EMA {}", params.ema_short_len),
                Some(self.ema35),
            ),
            row(
                format!("Price > EMA {}", params.ema_mid_len),
                self.price_over_ema50,
                format!("EMA {}", params.ema_mid_len),
                Some(self.ema50),
            ),
            row(
                format!("Price > EMA {}", params.ema_long_len),
                self.price_over_ema200,
                format!("EMA {}", params.ema_long_len),
                Some(self.ema200),
            ),
            row(
                format!("RSI < {}", params.rsi_buy_threshold),
                self.rsi_in_buy_range,
                "RSI".to_string(),
                self.rsi,
            ),
            row(
                "Price < KC Lower".to_string(),
                self.kc_in_buy_range,
                "KC Lower".to_string(),
                Some(self.kc_lower),
            ),
            row(
                "MACD Bullish Crossover".to_string(),
                self.macd_bullish_crossover,
                "MACD Hist".to_string(),
                Some(self.macd_hist),
            ),
        ]
    }

    /// Flat name/value listing of every field, for logging
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("price", fmt_value(Some(self.price))),
            ("ema35", fmt_value(Some(self.ema35))),
            ("ema50", fmt_value(Some(self.ema50))),
            ("ema200", fmt_value(Some(self.ema200))),
            ("rsi", fmt_value(self.rsi)),
            ("kc_lower", fmt_value(Some(self.kc_lower))),
            ("macd_line", fmt_value(Some(self.macd_line))),
            ("signal_line", fmt_value(Some(self.signal_line))),
            ("macd_hist", fmt_value(Some(self.macd_hist))),
            ("price_over_ema35", self.price_over_ema35.to_string()),
            ("price_over_ema50", self.price_over_ema50.to_string()),
            ("price_over_ema200", self.price_over_ema200.to_string()),
            ("rsi_in_buy_range", self.rsi_in_buy_range.to_string()),
            ("kc_in_buy_range", self.kc_in_buy_range.to_string()),
            ("macd_bullish_crossover", self.macd_bullish_crossover.to_string()),
            ("overall_buy", self.overall_buy.to_string()),
        ]
    }
}

/// Evaluate the buy conditions on the most recent bar
pub fn analyze(ticker: &str, bars: &[Bar], params: &IndicatorParams) -> Result<Analysis> {
    if bars.len() < MIN_BARS {
        return Err(AlerterError::InsufficientData {
            ticker: ticker.to_string(),
            needed: MIN_BARS,
            got: bars.len(),
        });
    }

    let cols = BarColumns::from_bars(bars);
    let close = &cols.close;
    let last = close.len() - 1;

    let ema35 = ema(close, params.ema_short_len);
    let ema50 = ema(close, params.ema_mid_len);
    let ema200 = ema(close, params.ema_long_len);
    let rsi_series = rsi(close, params.rsi_len);
    let kc = keltner(
        &cols.high,
        &cols.low,
        close,
        params.kc_len,
        params.kc_atr_len,
        params.kc_multiplier,
    );
    let m = macd(
        close,
        params.macd_fast_len,
        params.macd_slow_len,
        params.macd_signal_len,
    );

    let price = close[last];
    let latest_rsi = rsi_series[last];

    let price_over_ema35 = price > ema35[last];
    let price_over_ema50 = price > ema50[last];
    let price_over_ema200 = price > ema200[last];
    // An undefined RSI never counts as oversold
    let rsi_in_buy_range = latest_rsi.is_some_and(|r| r < params.rsi_buy_threshold);
    let kc_in_buy_range = price < kc.lower[last];
    let macd_bullish_crossover =
        m.line[last] > m.signal[last] && m.line[last - 1] <= m.signal[last - 1];

    let overall_buy = price_over_ema35
        && price_over_ema50
        && price_over_ema200
        && rsi_in_buy_range
        && kc_in_buy_range
        && macd_bullish_crossover;

    debug!(
        "{} analyzed over {} bars: price={:.2} rsi={} overall_buy={}",
        ticker,
        bars.len(),
        price,
        fmt_value(latest_rsi),
        overall_buy
    );

    Ok(Analysis {
        price,
        ema35: ema35[last],
        ema50: ema50[last],
        ema200: ema200[last],
        rsi: latest_rsi,
        kc_lower: kc.lower[last],
        macd_line: m.line[last],
        signal_line: m.signal[last],
        macd_hist: m.histogram[last],
        price_over_ema35,
        price_over_ema50,
        price_over_ema200,
        rsi_in_buy_range,
        kc_in_buy_range,
        macd_bullish_crossover,
        overall_buy,
    })
}
