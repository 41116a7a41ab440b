//! Technical indicator calculations
//!
//! Pure functions over price columns. Every output is aligned index-for-index
//! with its input; `None` marks warm-up positions and undefined values.

/// Trading days per year used to annualize daily volatility
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

// =============================================================================
// Moving averages
// =============================================================================

/// Exponential moving average with `alpha = 2 / (span + 1)`.
///
/// Non-adjusted recursion seeded with the first value, so every output
/// position is defined.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &x in values {
        let next = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

/// Simple rolling mean; the first `window - 1` positions are undefined.
///
/// Each window is summed on its own so an all-zero window is exactly zero.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return None;
            }
            let sum: f64 = values[i + 1 - window..=i].iter().sum();
            Some(sum / window as f64)
        })
        .collect()
}

// =============================================================================
// Differences and returns
// =============================================================================

/// First difference; index 0 is undefined
pub fn diff(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i == 0 {
            out.push(None);
        } else {
            out.push(Some(values[i] - values[i - 1]));
        }
    }
    out
}

/// Fractional change from the previous value; undefined at index 0 and after a zero
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i == 0 || values[i - 1] == 0.0 {
            out.push(None);
        } else {
            out.push(Some(values[i] / values[i - 1] - 1.0));
        }
    }
    out
}

/// Rolling sample standard deviation (n - 1). Windows containing an undefined
/// value are undefined.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if window < 2 || i + 1 < window {
            out.push(None);
            continue;
        }
        let slice = &values[i + 1 - window..=i];
        let Some(points) = slice.iter().copied().collect::<Option<Vec<f64>>>() else {
            out.push(None);
            continue;
        };
        let n = points.len() as f64;
        let mean = points.iter().sum::<f64>() / n;
        let variance = points.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        out.push(Some(variance.sqrt()));
    }
    out
}

/// Rolling standard deviation of returns scaled by `sqrt(252)`
pub fn annualized_volatility(returns: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling_std(returns, window)
        .into_iter()
        .map(|v| v.map(|s| s * TRADING_DAYS_PER_YEAR.sqrt()))
        .collect()
}

// =============================================================================
// Oscillators
// =============================================================================

/// Relative Strength Index using simple rolling means of gains and losses.
///
/// The undefined first difference counts as a zero move, so the first defined
/// value sits at index `window - 1`. A window with no losses reads 100; a
/// window with neither gains nor losses is undefined.
pub fn rsi(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let deltas: Vec<f64> = diff(values).into_iter().map(|d| d.unwrap_or(0.0)).collect();
    let gains: Vec<f64> = deltas.iter().map(|d| d.max(0.0)).collect();
    let losses: Vec<f64> = deltas.iter().map(|d| (-d).max(0.0)).collect();

    sma(&gains, window)
        .into_iter()
        .zip(sma(&losses, window))
        .map(|(gain, loss)| {
            let (gain, loss) = (gain?, loss?);
            if loss == 0.0 {
                if gain > 0.0 {
                    Some(100.0)
                } else {
                    None
                }
            } else {
                let rs = gain / loss;
                Some(100.0 - 100.0 / (1.0 + rs))
            }
        })
        .collect()
}

// =============================================================================
// Volatility bands
// =============================================================================

/// True range; the first bar has no previous close and uses `high - low`
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let hl = high[i] - low[i];
        if i == 0 {
            out.push(hl);
        } else {
            let prev = close[i - 1];
            out.push(hl.max((high[i] - prev).abs()).max((low[i] - prev).abs()));
        }
    }
    out
}

/// Average True Range smoothed with an EMA of the given span
pub fn atr(high: &[f64], low: &[f64], close: &[f64], window: usize) -> Vec<f64> {
    ema(&true_range(high, low, close), window)
}

/// Keltner channel around an EMA basis
#[derive(Debug, Clone, Default)]
pub struct KeltnerChannel {
    pub basis: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn keltner(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    len: usize,
    atr_len: usize,
    multiplier: f64,
) -> KeltnerChannel {
    let basis = ema(close, len);
    let range = atr(high, low, close, atr_len);
    let upper = basis
        .iter()
        .zip(&range)
        .map(|(b, a)| b + a * multiplier)
        .collect();
    let lower = basis
        .iter()
        .zip(&range)
        .map(|(b, a)| b - a * multiplier)
        .collect();
    KeltnerChannel {
        basis,
        upper,
        lower,
    }
}

// =============================================================================
// Trend
// =============================================================================

/// MACD line, signal line and histogram
#[derive(Debug, Clone, Default)]
pub struct Macd {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(values: &[f64], fast_len: usize, slow_len: usize, signal_len: usize) -> Macd {
    let fast = ema(values, fast_len);
    let slow = ema(values, slow_len);
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema(&line, signal_len);
    let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();
    Macd {
        line,
        signal,
        histogram,
    }
}
