//! Indicator library.
//!
//! Series indicators implement the `Indicator` trait from
//! `components::indicator`; each also has a scalar accessor for the last bar
//! that returns the neutral sentinel (0.0) when history is insufficient.
//! Band indicators (Bollinger, Keltner) return all three bands at once.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod donchian;
pub mod ema;
pub mod keltner;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod snapshot;
pub mod volatility;
pub mod volume;

pub use adx::{adx, Adx};
pub use atr::{atr, true_range, wilder_smooth, Atr};
pub use bollinger::bollinger_bands;
pub use donchian::{Donchian, DonchianBand};
pub use ema::{ema_of_series, Ema};
pub use keltner::keltner_channel;
pub use macd::{macd, macd_series, MacdParams, MacdSeries, MacdValue};
pub use rsi::{rsi, Rsi, RsiMode};
pub use sma::{sma_of_series, Sma};
pub use snapshot::{IndicatorSnapshot, SnapshotParams};
pub use volatility::{iv_rank_proxy, realized_vol_series, realized_volatility, TRADING_DAYS};
pub use volume::{average_turnover, volume_ratio};

/// Upper/middle/lower series of a band indicator. NaN during warmup.
#[derive(Debug, Clone, PartialEq)]
pub struct Bands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl Bands {
    pub(crate) fn empty(n: usize) -> Self {
        Self {
            upper: vec![f64::NAN; n],
            middle: vec![f64::NAN; n],
            lower: vec![f64::NAN; n],
        }
    }
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for the first bar), high = max(open,close) + 1.0,
/// low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                symbol: "TEST".to_string(),
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Create bars from explicit (open, high, low, close) tuples for testing.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            symbol: "TEST".to_string(),
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
