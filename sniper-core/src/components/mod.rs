//! Scanner components: the indicator abstraction and the pattern detectors
//! built on top of it.

pub mod indicator;
pub mod signal;

pub use indicator::{last_or_sentinel, Indicator, SENTINEL};
pub use signal::{
    breakout_direction, donchian_high_low, in_squeeze_breakout, squeeze_flags, BreakoutDirection,
};
