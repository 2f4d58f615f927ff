//! ADX: Average Directional Index (Wilder).
//!
//! +DM/-DM from consecutive bars, Wilder-smoothed alongside TR into +DI/-DI,
//! DX = 100 * |+DI - -DI| / (+DI + -DI), ADX = Wilder-smoothed DX.
//!
//! Lookback: 2 * period.

use crate::components::indicator::{last_or_sentinel, Indicator};
use crate::domain::Bar;
use crate::indicators::atr::{true_range, wilder_smooth};

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

fn directional_movement(bars: &[Bar]) -> (Vec<f64>, Vec<f64>) {
    let n = bars.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        if up.is_nan() || down.is_nan() {
            continue;
        }
        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    (plus_dm, minus_dm)
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        if n < 2 * self.period {
            return vec![f64::NAN; n];
        }

        let (plus_dm, minus_dm) = directional_movement(bars);
        let smooth_tr = wilder_smooth(&true_range(bars), self.period);
        let smooth_plus = wilder_smooth(&plus_dm, self.period);
        let smooth_minus = wilder_smooth(&minus_dm, self.period);

        let dx: Vec<f64> = (0..n)
            .map(|i| {
                let tr = smooth_tr[i];
                if tr.is_nan() || smooth_plus[i].is_nan() || smooth_minus[i].is_nan() || tr == 0.0 {
                    return f64::NAN;
                }
                let plus_di = 100.0 * smooth_plus[i] / tr;
                let minus_di = 100.0 * smooth_minus[i] / tr;
                let sum = plus_di + minus_di;
                if sum == 0.0 {
                    0.0
                } else {
                    100.0 * (plus_di - minus_di).abs() / sum
                }
            })
            .collect();

        wilder_smooth(&dx, self.period)
    }
}

/// ADX at the last bar; 0.0 with fewer than `2 * period` bars.
pub fn adx(bars: &[Bar], period: usize) -> f64 {
    if period == 0 {
        return 0.0;
    }
    last_or_sentinel(&Adx::new(period).compute(bars))
}
