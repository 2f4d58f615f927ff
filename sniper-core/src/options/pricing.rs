//! Black-Scholes pricing and greeks.
//!
//! T = days / 365. Every function returns 0.0 for degenerate inputs
//! (T <= 0, sigma <= 0, spot <= 0, strike <= 0, or any non-finite input)
//! instead of dividing by zero.
//!
//! Delta carries the e^{-rT} discount on both sides:
//! call = e^{-rT} N(d1), put = -e^{-rT} N(-d1). The strangle PoP model is
//! built on this form.

use serde::{Deserialize, Serialize};

const DAYS_PER_YEAR: f64 = 365.0;

/// Complementary error function.
///
/// Chebyshev fit with fractional error below 1.2e-7 everywhere, which is
/// far tighter than any quoted option premium.
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

pub fn erf(x: f64) -> f64 {
    1.0 - erfc(x)
}

/// Standard normal CDF.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Standard normal density.
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// Validated model inputs. `None` when the inputs are degenerate.
#[derive(Debug, Clone, Copy)]
struct Inputs {
    spot: f64,
    strike: f64,
    t: f64,
    vol: f64,
    rate: f64,
    d1: f64,
    d2: f64,
}

impl Inputs {
    fn new(spot: f64, strike: f64, days: f64, vol: f64, rate: f64) -> Option<Self> {
        let finite = [spot, strike, days, vol, rate].iter().all(|v| v.is_finite());
        if !finite || spot <= 0.0 || strike <= 0.0 || days <= 0.0 || vol <= 0.0 {
            return None;
        }
        let t = days / DAYS_PER_YEAR;
        let sqrt_t = t.sqrt();
        let d1 = ((spot / strike).ln() + (rate + 0.5 * vol * vol) * t) / (vol * sqrt_t);
        Some(Self {
            spot,
            strike,
            t,
            vol,
            rate,
            d1,
            d2: d1 - vol * sqrt_t,
        })
    }

    fn discount(&self) -> f64 {
        (-self.rate * self.t).exp()
    }
}

pub fn bs_delta(spot: f64, strike: f64, days: f64, is_call: bool, vol: f64, rate: f64) -> f64 {
    let Some(x) = Inputs::new(spot, strike, days, vol, rate) else {
        return 0.0;
    };
    if is_call {
        x.discount() * norm_cdf(x.d1)
    } else {
        -x.discount() * norm_cdf(-x.d1)
    }
}

/// Theoretical premium.
pub fn bs_price(spot: f64, strike: f64, days: f64, is_call: bool, vol: f64, rate: f64) -> f64 {
    let Some(x) = Inputs::new(spot, strike, days, vol, rate) else {
        return 0.0;
    };
    let pv_strike = x.strike * x.discount();
    if is_call {
        x.spot * norm_cdf(x.d1) - pv_strike * norm_cdf(x.d2)
    } else {
        pv_strike * norm_cdf(-x.d2) - x.spot * norm_cdf(-x.d1)
    }
}

pub fn bs_gamma(spot: f64, strike: f64, days: f64, vol: f64, rate: f64) -> f64 {
    let Some(x) = Inputs::new(spot, strike, days, vol, rate) else {
        return 0.0;
    };
    norm_pdf(x.d1) / (x.spot * x.vol * x.t.sqrt())
}

/// Premium change per 1 vol point (0.01).
pub fn bs_vega(spot: f64, strike: f64, days: f64, vol: f64, rate: f64) -> f64 {
    let Some(x) = Inputs::new(spot, strike, days, vol, rate) else {
        return 0.0;
    };
    x.spot * norm_pdf(x.d1) * x.t.sqrt() / 100.0
}

/// Premium change per calendar day.
pub fn bs_theta(spot: f64, strike: f64, days: f64, is_call: bool, vol: f64, rate: f64) -> f64 {
    let Some(x) = Inputs::new(spot, strike, days, vol, rate) else {
        return 0.0;
    };
    let decay = -x.spot * norm_pdf(x.d1) * x.vol / (2.0 * x.t.sqrt());
    let carry = x.rate * x.strike * x.discount();
    let annual = if is_call {
        decay - carry * norm_cdf(x.d2)
    } else {
        decay + carry * norm_cdf(-x.d2)
    };
    annual / DAYS_PER_YEAR
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
}

impl Greeks {
    pub fn compute(spot: f64, strike: f64, days: f64, is_call: bool, vol: f64, rate: f64) -> Self {
        Self {
            price: bs_price(spot, strike, days, is_call, vol, rate),
            delta: bs_delta(spot, strike, days, is_call, vol, rate),
            gamma: bs_gamma(spot, strike, days, vol, rate),
            vega: bs_vega(spot, strike, days, vol, rate),
            theta: bs_theta(spot, strike, days, is_call, vol, rate),
        }
    }
}
