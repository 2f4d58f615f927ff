//! MACD: Moving Average Convergence/Divergence.
//!
//! line      = EMA(close, fast) - EMA(close, slow)
//! signal    = EMA(line, signal)
//! histogram = line - signal
//!
//! Lookback: slow - 1 for the line, slow + signal - 2 for signal/histogram.

use crate::domain::Bar;
use crate::indicators::ema::ema_of_series;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Last-bar MACD values; all zero when undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

pub fn macd_series(bars: &[Bar], params: MacdParams) -> MacdSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let fast = ema_of_series(&closes, params.fast);
    let slow = ema_of_series(&closes, params.slow);

    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_of_series(&line, params.signal);
    let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}

pub fn macd(bars: &[Bar], params: MacdParams) -> MacdValue {
    let series = macd_series(bars, params);
    match (series.line.last(), series.signal.last(), series.histogram.last()) {
        (Some(l), Some(s), Some(h)) if l.is_finite() && s.is_finite() && h.is_finite() => MacdValue {
            line: *l,
            signal: *s,
            histogram: *h,
        },
        _ => MacdValue::default(),
    }
}
