//! Per-scan symbol context.
//!
//! Bars are fetched once per symbol per scan and every tier reads from this
//! cache, so falling back through tiers never re-hits the data API for bars.

use crate::config::ScanConfig;
use crate::filter::{FilterChain, FilterVerdict};
use sniper_core::components::{breakout_direction, in_squeeze_breakout, BreakoutDirection};
use sniper_core::domain::Bar;
use sniper_core::indicators::IndicatorSnapshot;

#[derive(Debug, Clone)]
pub struct SymbolContext {
    pub symbol: String,
    pub sector: Option<String>,
    pub bars: Vec<Bar>,
    pub snapshot: IndicatorSnapshot,
    pub verdict: FilterVerdict,
    /// Donchian breakout on the last bar.
    pub breakout: Option<BreakoutDirection>,
    /// True when the squeeze detector confirms `breakout`.
    pub squeeze_confirmed: bool,
}

impl SymbolContext {
    pub fn build(
        symbol: &str,
        sector: Option<&str>,
        bars: Vec<Bar>,
        config: &ScanConfig,
        filters: &FilterChain,
    ) -> Self {
        let snapshot = IndicatorSnapshot::compute(&bars, &config.snapshot_params());
        let verdict = filters.evaluate(&snapshot);
        let breakout = breakout_direction(&bars, config.donchian_window);
        let squeeze_confirmed = breakout.is_some_and(|dir| {
            in_squeeze_breakout(&bars, config.squeeze_window, config.squeeze_bars, dir)
        });
        Self {
            symbol: symbol.to_string(),
            sector: sector.map(str::to_string),
            bars,
            snapshot,
            verdict,
            breakout,
            squeeze_confirmed,
        }
    }

    pub fn passes_filters(&self) -> bool {
        self.verdict.is_passed()
    }

    /// Direction of a confirmed breakout-plus-squeeze signal.
    pub fn signal(&self) -> Option<BreakoutDirection> {
        if self.squeeze_confirmed {
            self.breakout
        } else {
            None
        }
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }
}
