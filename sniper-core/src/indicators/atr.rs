//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR is the Wilder-smoothed rolling mean of TR (alpha = 1/period).
//! Lookback: period (TR needs a previous close, so the seed starts at bar 1).

use crate::components::indicator::{last_or_sentinel, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// True Range series.
///
/// TR[0] is NaN: without a previous close the first bar has no true range.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut tr = vec![f64::NAN; bars.len()];
    for (i, pair) in bars.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        let (h, l, pc) = (cur.high, cur.low, prev.close);
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            continue;
        }
        tr[i + 1] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }
    tr
}

/// Wilder smoothing of a series. Alpha = 1/period.
///
/// The seed is the mean of the first run of `period` consecutive valid values;
/// a NaN after the seed taints everything that follows.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let mut run = 0;
    let mut seed_end = None;
    for (i, v) in values.iter().enumerate() {
        if v.is_nan() {
            run = 0;
            continue;
        }
        run += 1;
        if run == period {
            seed_end = Some(i + 1);
            break;
        }
    }
    let Some(seed_end) = seed_end else {
        return result;
    };

    let seed = values[seed_end - period..seed_end].iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = seed;

    let alpha = 1.0 / period as f64;
    let mut prev = seed;
    for i in seed_end..n {
        if values[i].is_nan() {
            return result;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }

    result
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        wilder_smooth(&true_range(bars), self.period)
    }
}

/// ATR at the last bar; 0.0 when undefined.
pub fn atr(bars: &[Bar], period: usize) -> f64 {
    if period == 0 {
        return 0.0;
    }
    last_or_sentinel(&Atr::new(period).compute(bars))
}
