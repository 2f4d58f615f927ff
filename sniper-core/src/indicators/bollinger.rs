//! Bollinger Bands: SMA(close) +/- multiplier * stddev(close).
//!
//! Uses population stddev (divide by N). Lookback: period - 1.

use crate::domain::Bar;
use crate::indicators::Bands;

pub fn bollinger_bands(bars: &[Bar], period: usize, multiplier: f64) -> Bands {
    let n = bars.len();
    let mut bands = Bands::empty(n);
    if period == 0 || n < period {
        return bands;
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    for (start, window) in closes.windows(period).enumerate() {
        let i = start + period - 1;
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|c| (c - mean) * (c - mean)).sum::<f64>() / period as f64;
        let stddev = variance.sqrt();

        bands.middle[i] = mean;
        bands.upper[i] = mean + multiplier * stddev;
        bands.lower[i] = mean - multiplier * stddev;
    }

    bands
}
