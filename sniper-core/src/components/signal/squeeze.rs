//! Volatility squeeze breakout (TTM-style).
//!
//! Bollinger = SMA(window) +/- 2 stdev, Keltner = EMA(window) +/- 1.5 ATR(window).
//! A bar is "in squeeze" when the Bollinger band sits strictly inside the
//! Keltner channel. The breakout fires when the last `squeeze_bars` bars
//! (current bar included) are all in squeeze and the current close is
//! outside the Bollinger band in the requested direction.

use crate::domain::Bar;
use crate::indicators::{bollinger_bands, keltner_channel, Bands};

use super::BreakoutDirection;

pub const BOLLINGER_MULT: f64 = 2.0;
pub const KELTNER_MULT: f64 = 1.5;

fn is_squeeze(bb: &Bands, kc: &Bands, i: usize) -> bool {
    // NaN comparisons are false, so warmup bars are never in squeeze
    bb.upper[i] < kc.upper[i] && bb.lower[i] > kc.lower[i]
}

/// Per-bar squeeze flags over the whole series.
pub fn squeeze_flags(bars: &[Bar], window: usize) -> Vec<bool> {
    let bb = bollinger_bands(bars, window, BOLLINGER_MULT);
    let kc = keltner_channel(bars, window, window, KELTNER_MULT);
    (0..bars.len()).map(|i| is_squeeze(&bb, &kc, i)).collect()
}

pub fn in_squeeze_breakout(
    bars: &[Bar],
    window: usize,
    squeeze_bars: usize,
    direction: BreakoutDirection,
) -> bool {
    let n = bars.len();
    if window == 0 || squeeze_bars == 0 || n < window + squeeze_bars {
        return false;
    }

    let bb = bollinger_bands(bars, window, BOLLINGER_MULT);
    let kc = keltner_channel(bars, window, window, KELTNER_MULT);

    if !(n - squeeze_bars..n).all(|i| is_squeeze(&bb, &kc, i)) {
        return false;
    }

    let last = n - 1;
    let close = bars[last].close;
    match direction {
        BreakoutDirection::Up => close > bb.upper[last],
        BreakoutDirection::Down => close < bb.lower[last],
    }
}
