//! Option chain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strike price as a map key.
///
/// Exchange strikes are multiples of the tick, so two decimals of precision
/// are enough; the key stores paise (strike × 100) to keep ordering exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StrikeKey(pub i64);

impl StrikeKey {
    pub fn from_price(strike: f64) -> Self {
        Self((strike * 100.0).round() as i64)
    }

    pub fn price(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

/// Listed contracts for one underlying and expiry, as returned by a data client.
///
/// Maps strike → tradable instrument key (e.g. `NFO:INFY25JUL1600CE`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionChain {
    pub calls: BTreeMap<StrikeKey, String>,
    pub puts: BTreeMap<StrikeKey, String>,
}

impl OptionChain {
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }
}

/// Option chain for a single scan instant.
///
/// Strikes are ascending. Premiums are only filled in for strikes that were
/// actually selected, one quote per leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChainSnapshot {
    pub symbol: String,
    pub expiry: NaiveDate,
    pub days_to_expiry: i64,
    pub chain: OptionChain,
    pub premiums: BTreeMap<String, f64>,
}

impl OptionChainSnapshot {
    pub fn new(symbol: impl Into<String>, expiry: NaiveDate, today: NaiveDate, chain: OptionChain) -> Self {
        Self {
            symbol: symbol.into(),
            expiry,
            days_to_expiry: (expiry - today).num_days(),
            chain,
            premiums: BTreeMap::new(),
        }
    }

    pub fn call_strikes(&self) -> Vec<f64> {
        self.chain.calls.keys().map(|k| k.price()).collect()
    }

    pub fn put_strikes(&self) -> Vec<f64> {
        self.chain.puts.keys().map(|k| k.price()).collect()
    }

    pub fn call_key(&self, strike: f64) -> Option<&str> {
        self.chain.calls.get(&StrikeKey::from_price(strike)).map(String::as_str)
    }

    pub fn put_key(&self, strike: f64) -> Option<&str> {
        self.chain.puts.get(&StrikeKey::from_price(strike)).map(String::as_str)
    }

    pub fn set_premium(&mut self, key: impl Into<String>, premium: f64) {
        self.premiums.insert(key.into(), premium);
    }

    pub fn premium(&self, key: &str) -> Option<f64> {
        self.premiums.get(key).copied()
    }
}
