//! Data layer: rate-limited upstream access.
//!
//! `DataClient` is the brokerage capability (Kite, synthetic, test doubles).
//! `MarketDataSource` wraps one in a `RateLimitedClient`, applies the shared
//! `RetryPolicy`, and hands the rest of the scanner plain `Option`s.

pub mod clock;
pub mod instruments;
pub mod kite;
pub mod market_data;
pub mod provider;
pub mod rate_gate;
pub mod rate_limited;
pub mod retry;
pub mod synthetic;
pub mod universe;

pub use clock::{Clock, ManualClock, SystemClock};
pub use instruments::{InstrumentMap, InstrumentMapError};
pub use kite::{KiteClient, KiteCredentials};
pub use market_data::MarketDataSource;
pub use provider::{equity_key, DataClient, DataError, Interval, RawBar};
pub use rate_gate::{RateGate, RateGateConfig};
pub use rate_limited::RateLimitedClient;
pub use retry::RetryPolicy;
pub use synthetic::SyntheticClient;
pub use universe::Universe;
