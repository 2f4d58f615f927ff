//! Option pricing model: Black-Scholes greeks, strangle strike selection
//! and the monthly expiry calendar.

pub mod expiry;
pub mod pricing;
pub mod strikes;

pub use expiry::{last_thursday, next_monthly_expiry};
pub use pricing::{bs_delta, bs_gamma, bs_price, bs_theta, bs_vega, norm_cdf, norm_pdf, Greeks};
pub use strikes::{round_to_step, select_strangle_strikes, select_with_fallback, strangle_band, StrikeSelection};
