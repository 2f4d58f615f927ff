//! Realized volatility and an IV-rank proxy.
//!
//! The broker API exposes no implied-vol history, so the rank is taken over
//! realized volatility instead: where today's reading sits inside its own
//! trailing distribution.

use crate::domain::Bar;

/// Trading days per year used for annualisation.
pub const TRADING_DAYS: f64 = 252.0;

/// Annualised sample stdev of daily log returns over a rolling `window`.
///
/// Value at bar t uses the returns ending at t, so the first valid index is
/// `window` (the first return needs a previous close).
pub fn realized_vol_series(bars: &[Bar], window: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if window < 2 || n < window + 1 {
        return result;
    }

    let mut returns = vec![f64::NAN; n];
    for i in 1..n {
        let (prev, cur) = (bars[i - 1].close, bars[i].close);
        if prev > 0.0 && cur > 0.0 {
            returns[i] = (cur / prev).ln();
        }
    }

    for i in window..n {
        let slice = &returns[i + 1 - window..=i];
        if slice.iter().any(|r| r.is_nan()) {
            continue;
        }
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / (window - 1) as f64;
        result[i] = var.sqrt() * TRADING_DAYS.sqrt();
    }

    result
}

/// Realized volatility at the last bar, `None` when undefined.
pub fn realized_volatility(bars: &[Bar], window: usize) -> Option<f64> {
    realized_vol_series(bars, window)
        .last()
        .copied()
        .filter(|v| v.is_finite())
}

/// Percentile rank (0-100) of the current realized vol among the last
/// `history` readings, current one included.
///
/// 0.0 when fewer than two readings exist.
pub fn iv_rank_proxy(bars: &[Bar], window: usize, history: usize) -> f64 {
    let series = realized_vol_series(bars, window);
    let start = series.len().saturating_sub(history);
    let readings: Vec<f64> = series[start..].iter().copied().filter(|v| v.is_finite()).collect();

    let Some(&current) = readings.last() else {
        return 0.0;
    };
    if readings.len() < 2 {
        return 0.0;
    }
    let below = readings.iter().filter(|v| **v < current).count();
    100.0 * below as f64 / (readings.len() - 1) as f64
}
