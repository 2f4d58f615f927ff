//! Data client capability and structured error types.
//!
//! `DataClient` abstracts over the brokerage API so the scanner can run
//! against Kite Connect, the offline synthetic generator, or a scripted test
//! double. Rate limiting and retries sit above this trait; clients know
//! nothing about either.

use crate::domain::OptionChain;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Raw OHLCV bar as delivered by a client, before it is tagged with a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Candle interval for historical requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    Day,
}

impl Interval {
    /// Path segment used by the Kite historical endpoint.
    pub fn as_kite(self) -> &'static str {
        match self {
            Interval::Day => "day",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_kite())
    }
}

/// Structured error types for upstream data operations.
///
/// `RateLimited` is the only variant the retry policy treats as transient.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("instrument not found: {key}")]
    InstrumentNotFound { key: String },

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, DataError::RateLimited(_))
    }
}

/// Upstream market data capability.
pub trait DataClient: Send + Sync {
    /// Human-readable name of this client.
    fn name(&self) -> &str;

    /// Daily bars for an instrument token over `[start, end]`,
    /// oldest first.
    fn historical_bars(
        &self,
        instrument_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<RawBar>, DataError>;

    /// Last traded price for an exchange-qualified key such as `NSE:INFY`.
    fn last_traded_price(&self, instrument_key: &str) -> Result<f64, DataError>;

    /// Listed calls and puts for an underlying and expiry.
    fn option_chain(&self, symbol: &str, expiry: NaiveDate) -> Result<OptionChain, DataError>;

    /// True when `option_chain` would be answered from local state without
    /// an upstream request. Gated wrappers skip the rate gate in that case.
    fn chain_cached(&self) -> bool {
        false
    }
}

impl<C: DataClient + ?Sized> DataClient for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn historical_bars(
        &self,
        instrument_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<RawBar>, DataError> {
        (**self).historical_bars(instrument_id, start, end, interval)
    }

    fn last_traded_price(&self, instrument_key: &str) -> Result<f64, DataError> {
        (**self).last_traded_price(instrument_key)
    }

    fn option_chain(&self, symbol: &str, expiry: NaiveDate) -> Result<OptionChain, DataError> {
        (**self).option_chain(symbol, expiry)
    }

    fn chain_cached(&self) -> bool {
        (**self).chain_cached()
    }
}

impl<C: DataClient + ?Sized> DataClient for Arc<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn historical_bars(
        &self,
        instrument_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<RawBar>, DataError> {
        (**self).historical_bars(instrument_id, start, end, interval)
    }

    fn last_traded_price(&self, instrument_key: &str) -> Result<f64, DataError> {
        (**self).last_traded_price(instrument_key)
    }

    fn option_chain(&self, symbol: &str, expiry: NaiveDate) -> Result<OptionChain, DataError> {
        (**self).option_chain(symbol, expiry)
    }

    fn chain_cached(&self) -> bool {
        (**self).chain_cached()
    }
}

/// Exchange-qualified key for an NSE cash equity.
pub fn equity_key(symbol: &str) -> String {
    format!("NSE:{symbol}")
}
