//! Symbol → instrument token lookup.
//!
//! Kite addresses historical data by numeric instrument token. The map is a
//! plain JSON document (`equities` and `futures` tables) so it can be
//! regenerated from the exchange instrument dump without a rebuild.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstrumentMapError {
    #[error("read instrument map {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse instrument map: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentMap {
    #[serde(default)]
    pub equities: BTreeMap<String, u64>,
    /// Near-month futures contract per underlying.
    #[serde(default)]
    pub futures: BTreeMap<String, u64>,
}

impl InstrumentMap {
    pub fn from_file(path: &Path) -> Result<Self, InstrumentMapError> {
        let content = std::fs::read_to_string(path).map_err(|source| InstrumentMapError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, InstrumentMapError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn equity_token(&self, symbol: &str) -> Option<u64> {
        self.equities.get(symbol).copied()
    }

    pub fn futures_token(&self, symbol: &str) -> Option<u64> {
        self.futures.get(symbol).copied()
    }

    pub fn has_futures(&self, symbol: &str) -> bool {
        self.futures.contains_key(symbol)
    }

    /// NSE cash tokens for the default F&O universe.
    pub fn default_nse() -> Self {
        let equities = [
            ("RELIANCE", 738_561),
            ("HDFCBANK", 341_249),
            ("ICICIBANK", 1_270_529),
            ("INFY", 408_065),
            ("TCS", 2_953_217),
            ("SBIN", 779_521),
            ("LTIM", 2_631_937),
            ("TITAN", 10_005_857),
            ("ONGC", 5_409_281),
            ("CIPLA", 350_067),
        ]
        .into_iter()
        .map(|(s, t)| (s.to_string(), t))
        .collect();

        Self {
            equities,
            futures: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_resolves() {
        let map = InstrumentMap::default_nse();
        assert_eq!(map.equity_token("INFY"), Some(408_065));
        assert_eq!(map.equity_token("NOPE"), None);
        assert!(!map.has_futures("INFY"));
    }

    #[test]
    fn parses_json_with_missing_futures() {
        let map = InstrumentMap::from_json(r#"{"equities": {"TCS": 2953217}}"#).unwrap();
        assert_eq!(map.equity_token("TCS"), Some(2_953_217));
        assert!(map.futures.is_empty());
    }

    #[test]
    fn rejects_bad_json() {
        assert!(matches!(
            InstrumentMap::from_json("{not json"),
            Err(InstrumentMapError::Parse(_))
        ));
    }
}
