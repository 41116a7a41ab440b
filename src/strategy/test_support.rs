use chrono::{Datelike, Duration, TimeZone, Utc};

use crate::domain::Bar;

/// Weekday-only daily bars starting Monday 2024-01-01, with alternating gaps
/// above and below the close so both SMA5 signals occur.
pub(crate) fn trading_bars(n: usize) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(n);
    let mut day = Utc.with_ymd_and_hms(2024, 1, 1, 21, 0, 0).unwrap();
    let mut i = 0usize;
    while bars.len() < n {
        if day.weekday().number_from_monday() <= 5 {
            let close = 400.0 + (i as f64 * 0.7).sin() * 4.0 + i as f64 * 0.1;
            let open = close + if i % 2 == 0 { 1.5 } else { -1.5 };
            bars.push(Bar {
                timestamp: day,
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1_000_000,
            });
            i += 1;
        }
        day += Duration::days(1);
    }
    bars
}
