//! Universe configuration: sector-organized ticker lists.
//!
//! Stored as TOML with one table of sector → tickers. Sector membership is
//! also what the sector momentum ranking groups by.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub sectors: BTreeMap<String, Vec<String>>,
}

impl Universe {
    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("read universe file: {e}"))?;
        Self::from_toml(&content)
    }

    /// Parse a universe from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("parse universe TOML: {e}"))
    }

    /// All tickers, sector by sector, without duplicates.
    pub fn all_tickers(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.sectors
            .values()
            .flat_map(|tickers| tickers.iter().map(String::as_str))
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// Sector a ticker belongs to (first match).
    pub fn sector_of(&self, ticker: &str) -> Option<&str> {
        self.sectors
            .iter()
            .find(|(_, tickers)| tickers.iter().any(|t| t == ticker))
            .map(|(sector, _)| sector.as_str())
    }

    pub fn sector_names(&self) -> Vec<&str> {
        self.sectors.keys().map(String::as_str).collect()
    }

    pub fn ticker_count(&self) -> usize {
        self.all_tickers().len()
    }

    /// Default NSE F&O large-cap universe.
    pub fn default_nse() -> Self {
        let table: [(&str, &[&str]); 5] = [
            ("Banking", &["HDFCBANK", "ICICIBANK", "SBIN"]),
            ("Consumer", &["TITAN"]),
            ("Energy", &["RELIANCE", "ONGC"]),
            ("IT", &["TCS", "INFY", "LTIM"]),
            ("Pharma", &["CIPLA"]),
        ];
        let sectors = table
            .iter()
            .map(|(sector, tickers)| {
                (
                    sector.to_string(),
                    tickers.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect();
        Self { sectors }
    }
}
