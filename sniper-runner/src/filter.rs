//! Base filters: gate symbols on momentum, trend strength, participation,
//! volatility regime and liquidity before any candidate is built.
//!
//! Filters only look at the last-bar indicator snapshot. A reading at the
//! neutral sentinel (0.0) fails every threshold above zero.

use crate::config::ScanConfig;
use serde::{Deserialize, Serialize};
use sniper_core::indicators::IndicatorSnapshot;

/// Outcome of a single filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterVerdict {
    Passed,
    Rejected {
        filter: String,
        value: f64,
        threshold: f64,
    },
}

impl FilterVerdict {
    pub fn is_passed(&self) -> bool {
        matches!(self, FilterVerdict::Passed)
    }
}

pub trait CandidateFilter: Send + Sync {
    fn name(&self) -> &str;

    /// The snapshot reading this filter compares.
    fn reading(&self, snapshot: &IndicatorSnapshot) -> f64;

    fn threshold(&self) -> f64;

    fn evaluate(&self, snapshot: &IndicatorSnapshot) -> FilterVerdict {
        let value = self.reading(snapshot);
        if value.is_finite() && value >= self.threshold() {
            FilterVerdict::Passed
        } else {
            FilterVerdict::Rejected {
                filter: self.name().to_string(),
                value,
                threshold: self.threshold(),
            }
        }
    }
}

/// RSI at or above the momentum floor.
#[derive(Debug, Clone)]
pub struct RsiFilter {
    pub min: f64,
}

impl CandidateFilter for RsiFilter {
    fn name(&self) -> &str {
        "rsi"
    }

    fn reading(&self, snapshot: &IndicatorSnapshot) -> f64 {
        snapshot.rsi
    }

    fn threshold(&self) -> f64 {
        self.min
    }
}

/// ADX at or above the trend-strength floor.
#[derive(Debug, Clone)]
pub struct AdxFilter {
    pub min: f64,
}

impl CandidateFilter for AdxFilter {
    fn name(&self) -> &str {
        "adx"
    }

    fn reading(&self, snapshot: &IndicatorSnapshot) -> f64 {
        snapshot.adx
    }

    fn threshold(&self) -> f64 {
        self.min
    }
}

/// Last volume at least `multiplier` × its trailing mean.
#[derive(Debug, Clone)]
pub struct VolumeFilter {
    pub multiplier: f64,
}

impl CandidateFilter for VolumeFilter {
    fn name(&self) -> &str {
        "volume"
    }

    fn reading(&self, snapshot: &IndicatorSnapshot) -> f64 {
        snapshot.volume_ratio
    }

    fn threshold(&self) -> f64 {
        self.multiplier
    }
}

#[derive(Debug, Clone)]
pub struct IvRankFilter {
    pub min: f64,
}

impl CandidateFilter for IvRankFilter {
    fn name(&self) -> &str {
        "iv_rank"
    }

    fn reading(&self, snapshot: &IndicatorSnapshot) -> f64 {
        snapshot.iv_rank
    }

    fn threshold(&self) -> f64 {
        self.min
    }
}

/// Average daily traded value floor.
#[derive(Debug, Clone)]
pub struct TurnoverFilter {
    pub min: f64,
}

impl CandidateFilter for TurnoverFilter {
    fn name(&self) -> &str {
        "turnover"
    }

    fn reading(&self, snapshot: &IndicatorSnapshot) -> f64 {
        snapshot.avg_turnover
    }

    fn threshold(&self) -> f64 {
        self.min
    }
}

/// All base filters, evaluated in order. The first rejection wins.
pub struct FilterChain {
    filters: Vec<Box<dyn CandidateFilter>>,
}

impl FilterChain {
    pub fn new(filters: Vec<Box<dyn CandidateFilter>>) -> Self {
        Self { filters }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(vec![
            Box::new(RsiFilter { min: config.rsi_min }),
            Box::new(AdxFilter { min: config.adx_min }),
            Box::new(VolumeFilter {
                multiplier: config.vol_multiplier,
            }),
            Box::new(IvRankFilter {
                min: config.iv_rank_min,
            }),
            Box::new(TurnoverFilter {
                min: config.min_turnover,
            }),
        ])
    }

    pub fn evaluate(&self, snapshot: &IndicatorSnapshot) -> FilterVerdict {
        self.filters
            .iter()
            .map(|f| f.evaluate(snapshot))
            .find(|v| !v.is_passed())
            .unwrap_or(FilterVerdict::Passed)
    }

    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain").field("filters", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sniper_core::indicators::MacdValue;

    fn snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            close: 1500.0,
            rsi: 62.0,
            adx: 28.0,
            atr: 25.0,
            sma: 1480.0,
            macd: MacdValue::default(),
            volume_ratio: 2.0,
            avg_turnover: 1e9,
            realized_vol: Some(0.22),
            iv_rank: 40.0,
        }
    }

    #[test]
    fn default_chain_passes_strong_snapshot() {
        let chain = FilterChain::from_config(&ScanConfig::default());
        assert!(chain.evaluate(&snapshot()).is_passed());
        assert_eq!(chain.names(), vec!["rsi", "adx", "volume", "iv_rank", "turnover"]);
    }

    #[test]
    fn first_rejection_is_reported() {
        let chain = FilterChain::from_config(&ScanConfig::default());
        let mut snap = snapshot();
        snap.adx = 12.0;
        snap.volume_ratio = 0.5;
        match chain.evaluate(&snap) {
            FilterVerdict::Rejected { filter, value, threshold } => {
                assert_eq!(filter, "adx");
                assert_eq!(value, 12.0);
                assert_eq!(threshold, 20.0);
            }
            FilterVerdict::Passed => panic!("expected rejection"),
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let filter = RsiFilter { min: 62.0 };
        assert!(filter.evaluate(&snapshot()).is_passed());
    }

    #[test]
    fn sentinel_readings_fail() {
        let mut snap = snapshot();
        snap.rsi = 0.0;
        assert!(!RsiFilter { min: 55.0 }.evaluate(&snap).is_passed());
        snap.avg_turnover = 0.0;
        assert!(!TurnoverFilter { min: 1.0 }.evaluate(&snap).is_passed());
    }

    #[test]
    fn nan_reading_is_rejected() {
        let mut snap = snapshot();
        snap.adx = f64::NAN;
        assert!(!AdxFilter { min: 0.0 }.evaluate(&snap).is_passed());
    }
}
