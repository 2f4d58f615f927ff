//! Scan report: the ranked candidates plus enough context to audit how
//! they were chosen. Serialised as JSON for the downstream ledger.

use crate::sector::SectorMomentum;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sniper_core::domain::{Candidate, Tier};
use std::path::Path;

/// Schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// A symbol dropped before the tier pass, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub scan_date: NaiveDate,
    pub expiry: Option<NaiveDate>,
    /// Tier that produced `candidates`, if any did.
    pub tier: Option<Tier>,
    /// Tiers entered, in order.
    pub tiers_attempted: Vec<Tier>,
    pub candidates: Vec<Candidate>,
    /// True when no symbol yielded usable data.
    pub starved: bool,
    pub symbols_scanned: usize,
    pub symbols_with_data: usize,
    pub filter_passers: usize,
    pub skipped: Vec<SkippedSymbol>,
    pub sectors: Vec<SectorMomentum>,
    pub config_hash: String,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize scan report")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse scan report")
    }
}

/// Write the report as pretty JSON, creating parent directories.
pub fn write_json(path: &Path, report: &ScanReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = report.to_json()?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write scan report to {}", path.display()))?;
    Ok(())
}
