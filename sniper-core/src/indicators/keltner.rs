//! Keltner Channel: EMA(close) +/- multiplier * ATR.
//!
//! Lookback: max(ema_period - 1, atr_period).

use crate::domain::Bar;
use crate::indicators::atr::{true_range, wilder_smooth};
use crate::indicators::ema::ema_of_series;
use crate::indicators::Bands;

pub fn keltner_channel(bars: &[Bar], ema_period: usize, atr_period: usize, multiplier: f64) -> Bands {
    let n = bars.len();
    let mut bands = Bands::empty(n);
    if ema_period == 0 || atr_period == 0 {
        return bands;
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema = ema_of_series(&closes, ema_period);
    let atr = wilder_smooth(&true_range(bars), atr_period);

    for i in 0..n {
        if ema[i].is_nan() || atr[i].is_nan() {
            continue;
        }
        bands.middle[i] = ema[i];
        bands.upper[i] = ema[i] + multiplier * atr[i];
        bands.lower[i] = ema[i] - multiplier * atr[i];
    }

    bands
}
