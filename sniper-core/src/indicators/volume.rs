//! Volume and liquidity measures.

use crate::domain::Bar;

/// Last bar's volume relative to the mean volume of the `window` bars before it.
///
/// 0.0 when there are fewer than `window + 1` bars or the prior mean is zero.
pub fn volume_ratio(bars: &[Bar], window: usize) -> f64 {
    let n = bars.len();
    if window == 0 || n < window + 1 {
        return 0.0;
    }
    let prior = &bars[n - 1 - window..n - 1];
    let mean = prior.iter().map(|b| b.volume as f64).sum::<f64>() / window as f64;
    if mean <= 0.0 {
        return 0.0;
    }
    bars[n - 1].volume as f64 / mean
}

/// Mean traded value (close × volume) over the last `window` bars.
///
/// Uses whatever is available when the series is shorter than `window`.
pub fn average_turnover(bars: &[Bar], window: usize) -> f64 {
    let take = window.min(bars.len());
    if take == 0 {
        return 0.0;
    }
    let recent = &bars[bars.len() - take..];
    let total: f64 = recent.iter().map(Bar::turnover).filter(|t| t.is_finite()).sum();
    total / take as f64
}
