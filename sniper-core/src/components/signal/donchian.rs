//! Donchian breakout detector.
//!
//! The channel is built from the `window` bars preceding the current one, so
//! the current close is compared against the range it may have just broken.

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::indicators::Donchian;

use super::BreakoutDirection;

/// Highest high and lowest low of the `window` bars before the last bar.
///
/// `None` when fewer than `window + 1` bars are supplied.
pub fn donchian_high_low(bars: &[Bar], window: usize) -> Option<(f64, f64)> {
    if window == 0 || bars.len() < window + 1 {
        return None;
    }
    let high = *Donchian::upper(window).compute(bars).last()?;
    let low = *Donchian::lower(window).compute(bars).last()?;
    if high.is_nan() || low.is_nan() {
        return None;
    }
    Some((high, low))
}

/// Up when the last close is at or above the channel high, Down when at or
/// below the channel low.
pub fn breakout_direction(bars: &[Bar], window: usize) -> Option<BreakoutDirection> {
    let (high, low) = donchian_high_low(bars, window)?;
    let close = bars.last()?.close;
    if close.is_nan() {
        None
    } else if close >= high {
        Some(BreakoutDirection::Up)
    } else if close <= low {
        Some(BreakoutDirection::Down)
    } else {
        None
    }
}
