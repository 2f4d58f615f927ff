//! Pattern detectors: breakout and volatility squeeze.
//!
//! Detectors are pure: bar history in, direction or verdict out. They never
//! fail; insufficient history means "no signal".

pub mod donchian;
pub mod squeeze;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use donchian::{breakout_direction, donchian_high_low};
pub use squeeze::{in_squeeze_breakout, squeeze_flags};

/// Direction of a breakout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreakoutDirection {
    Up,
    Down,
}

impl fmt::Display for BreakoutDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakoutDirection::Up => f.write_str("up"),
            BreakoutDirection::Down => f.write_str("down"),
        }
    }
}
