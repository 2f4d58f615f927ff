//! Indicator trait and scalar accessors.
//!
//! Indicators are pure functions: bar history in, numeric series out.
//! The scanner only ever looks at the last bar, so every series has a
//! scalar accessor that turns "not enough history" into the neutral
//! sentinel instead of NaN.

use crate::domain::Bar;

/// Neutral value returned when an indicator cannot be evaluated.
///
/// Filters compare against positive thresholds, so a 0.0 reading always
/// fails the filter rather than crashing the scan.
pub const SENTINEL: f64 = 0.0;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values should be `f64::NAN` (warmup).
///
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;

    /// Value at the last bar, or [`SENTINEL`] when undefined.
    fn last(&self, bars: &[Bar]) -> f64 {
        last_or_sentinel(&self.compute(bars))
    }
}

/// Last element of a series, mapping NaN/empty to [`SENTINEL`].
pub fn last_or_sentinel(series: &[f64]) -> f64 {
    match series.last() {
        Some(v) if v.is_finite() => *v,
        _ => SENTINEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_for_empty_and_nan() {
        assert_eq!(last_or_sentinel(&[]), SENTINEL);
        assert_eq!(last_or_sentinel(&[1.0, f64::NAN]), SENTINEL);
        assert_eq!(last_or_sentinel(&[f64::NAN, 42.0]), 42.0);
    }
}
