//! Short strangle strike selection.
//!
//! band = sigma_target * sqrt(days / 365), where sigma_target is the annual
//! volatility scaled by the number of sigmas wanted. The call leg is the
//! smallest listed strike at or above spot * (1 + band), the put leg the
//! largest listed strike at or below spot * (1 - band).

use crate::domain::OptionChainSnapshot;
use serde::{Deserialize, Serialize};

/// Fractional distance from spot for each strangle leg.
pub fn strangle_band(sigma_target: f64, days: f64) -> f64 {
    if !sigma_target.is_finite() || sigma_target <= 0.0 || days <= 0.0 {
        return 0.0;
    }
    sigma_target * (days / 365.0).sqrt()
}

/// Smallest strike >= `floor` in an ascending list.
fn first_at_or_above(strikes: &[f64], floor: f64) -> Option<f64> {
    strikes.iter().copied().find(|k| *k >= floor)
}

/// Largest strike <= `ceiling` in an ascending list.
fn last_at_or_below(strikes: &[f64], ceiling: f64) -> Option<f64> {
    strikes.iter().rev().copied().find(|k| *k <= ceiling)
}

/// (call_strike, put_strike), or `None` when either side has no listed strike
/// far enough from spot.
pub fn select_strangle_strikes(chain: &OptionChainSnapshot, spot: f64, band: f64) -> Option<(f64, f64)> {
    if spot <= 0.0 || !spot.is_finite() {
        return None;
    }
    let call = first_at_or_above(&chain.call_strikes(), spot * (1.0 + band))?;
    let put = last_at_or_below(&chain.put_strikes(), spot * (1.0 - band))?;
    Some((call, put))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeSelection {
    pub call_strike: f64,
    pub put_strike: f64,
    pub call_key: String,
    pub put_key: String,
    /// Sigma multiple that produced this selection.
    pub n_sigma: f64,
    pub band: f64,
}

/// Try each sigma multiple in order until both legs can be placed.
pub fn select_with_fallback(
    chain: &OptionChainSnapshot,
    spot: f64,
    vol: f64,
    sigmas: &[f64],
) -> Option<StrikeSelection> {
    let days = chain.days_to_expiry as f64;
    sigmas.iter().find_map(|&n_sigma| {
        let band = strangle_band(n_sigma * vol, days);
        if band <= 0.0 {
            return None;
        }
        let (call_strike, put_strike) = select_strangle_strikes(chain, spot, band)?;
        Some(StrikeSelection {
            call_strike,
            put_strike,
            call_key: chain.call_key(call_strike)?.to_string(),
            put_key: chain.put_key(put_strike)?.to_string(),
            n_sigma,
            band,
        })
    })
}

/// Round a price to the exchange strike step.
pub fn round_to_step(price: f64, step: f64, up: bool) -> f64 {
    if step <= 0.0 {
        return price;
    }
    let units = price / step;
    let units = if up { units.ceil() } else { units.floor() };
    units * step
}
