//! Relative Strength Index (RSI).
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Two averaging modes:
//! - Simple: plain mean of gains/losses over the trailing `period` changes.
//! - Wilder: seeded with the simple mean, then alpha = 1/period.
//!
//! Lookback: period.
//! Edge cases: avg_loss == 0 with gains → 100; no movement at all → 0.0
//! (the neutral sentinel, so a flat series never passes a momentum filter).

use crate::components::indicator::{last_or_sentinel, Indicator};
use crate::domain::Bar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiMode {
    Simple,
    #[default]
    Wilder,
}

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    mode: RsiMode,
    name: String,
}

impl Rsi {
    pub fn new(period: usize, mode: RsiMode) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        let suffix = match mode {
            RsiMode::Simple => "sma",
            RsiMode::Wilder => "wilder",
        };
        Self {
            period,
            mode,
            name: format!("rsi_{period}_{suffix}"),
        }
    }

    pub fn wilder(period: usize) -> Self {
        Self::new(period, RsiMode::Wilder)
    }

    pub fn simple(period: usize) -> Self {
        Self::new(period, RsiMode::Simple)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period + 1 {
            return result;
        }

        let mut gains = vec![f64::NAN; n];
        let mut losses = vec![f64::NAN; n];
        for i in 1..n {
            let ch = bars[i].close - bars[i - 1].close;
            if ch.is_nan() {
                continue;
            }
            gains[i] = ch.max(0.0);
            losses[i] = (-ch).max(0.0);
        }

        // Seed over the first `period` changes
        let seed_gain = &gains[1..=self.period];
        let seed_loss = &losses[1..=self.period];
        if seed_gain.iter().any(|v| v.is_nan()) {
            return result;
        }
        let mut avg_gain = seed_gain.iter().sum::<f64>() / self.period as f64;
        let mut avg_loss = seed_loss.iter().sum::<f64>() / self.period as f64;
        result[self.period] = compute_rsi(avg_gain, avg_loss);

        let alpha = 1.0 / self.period as f64;
        for i in (self.period + 1)..n {
            if gains[i].is_nan() {
                for val in result.iter_mut().skip(i) {
                    *val = f64::NAN;
                }
                return result;
            }

            match self.mode {
                RsiMode::Wilder => {
                    avg_gain = alpha * gains[i] + (1.0 - alpha) * avg_gain;
                    avg_loss = alpha * losses[i] + (1.0 - alpha) * avg_loss;
                }
                RsiMode::Simple => {
                    let start = i + 1 - self.period;
                    avg_gain = gains[start..=i].iter().sum::<f64>() / self.period as f64;
                    avg_loss = losses[start..=i].iter().sum::<f64>() / self.period as f64;
                }
            }

            result[i] = compute_rsi(avg_gain, avg_loss);
        }

        result
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        0.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// RSI at the last bar; 0.0 when there are fewer than `period + 1` bars.
pub fn rsi(bars: &[Bar], period: usize, mode: RsiMode) -> f64 {
    if period == 0 {
        return 0.0;
    }
    last_or_sentinel(&Rsi::new(period, mode).compute(bars))
}
