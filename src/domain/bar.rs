use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// A single daily OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn weekday(&self) -> Weekday {
        self.timestamp.weekday()
    }
}

/// Column views over a bar slice, in the layout the indicator functions expect
#[derive(Debug, Clone, Default)]
pub struct BarColumns {
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

impl BarColumns {
    pub fn from_bars(bars: &[Bar]) -> Self {
        let mut cols = Self {
            open: Vec::with_capacity(bars.len()),
            high: Vec::with_capacity(bars.len()),
            low: Vec::with_capacity(bars.len()),
            close: Vec::with_capacity(bars.len()),
        };
        for bar in bars {
            cols.open.push(bar.open);
            cols.high.push(bar.high);
            cols.low.push(bar.low);
            cols.close.push(bar.close);
        }
        cols
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}
