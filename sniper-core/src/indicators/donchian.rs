//! Donchian Channel: highest high / lowest low over a trailing window.
//!
//! The channel at bar t covers bars t-period..t-1: the current bar is
//! excluded so that a close can be compared against the range it broke.
//! Lookback: period.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

/// Which band of the Donchian channel to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonchianBand {
    Upper,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Donchian {
    period: usize,
    band: DonchianBand,
    name: String,
}

impl Donchian {
    pub fn upper(period: usize) -> Self {
        assert!(period >= 1, "Donchian period must be >= 1");
        Self {
            period,
            band: DonchianBand::Upper,
            name: format!("donchian_upper_{period}"),
        }
    }

    pub fn lower(period: usize) -> Self {
        assert!(period >= 1, "Donchian period must be >= 1");
        Self {
            period,
            band: DonchianBand::Lower,
            name: format!("donchian_lower_{period}"),
        }
    }
}

impl Indicator for Donchian {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        for i in self.period..n {
            let window = &bars[i - self.period..i];
            let value = match self.band {
                DonchianBand::Upper => window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max),
                DonchianBand::Lower => window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min),
            };
            if window.iter().any(|b| b.high.is_nan() || b.low.is_nan()) {
                continue;
            }
            result[i] = value;
        }

        result
    }
}
