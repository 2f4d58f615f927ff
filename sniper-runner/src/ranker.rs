//! Ranker: the scan pass and the tier fallback state machine.
//!
//! One pass over the universe fetches bars and builds a [`SymbolContext`]
//! per symbol. Tiers then run in order over those contexts and the first
//! tier that yields any candidate wins. Later tiers are never entered once
//! an earlier one is non-empty.

use crate::builder::{action_for, CandidateBuilder};
use crate::config::{ConfigError, ScanConfig};
use crate::context::SymbolContext;
use crate::filter::FilterChain;
use crate::report::{ScanReport, SkippedSymbol, SCHEMA_VERSION};
use crate::sector::{sector_momentum, top_sectors};
use sniper_core::data::{DataClient, MarketDataSource, Universe};
use sniper_core::domain::{Candidate, Tier, TradeAction};
use sniper_core::options::next_monthly_expiry;
use std::cmp::Ordering;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Tag on candidates whose sector ranks among the strongest.
pub const TAG_TOP_SECTOR: &str = "top-sector";

/// Setup failures. Anything that goes wrong per symbol during the scan is a
/// skip, not an error.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("universe is empty")]
    EmptyUniverse,
}

pub struct Ranker<'a, C> {
    config: &'a ScanConfig,
    source: &'a MarketDataSource<C>,
    universe: &'a Universe,
    filters: FilterChain,
}

impl<'a, C: DataClient> Ranker<'a, C> {
    pub fn new(config: &'a ScanConfig, source: &'a MarketDataSource<C>, universe: &'a Universe) -> Self {
        Self {
            config,
            source,
            universe,
            filters: FilterChain::from_config(config),
        }
    }

    pub fn run(&self) -> Result<ScanReport, ScanError> {
        self.config.validate()?;
        let tickers = self.universe.all_tickers();
        if tickers.is_empty() {
            return Err(ScanError::EmptyUniverse);
        }

        let scan_date = self.source.as_of();
        let expiry = next_monthly_expiry(scan_date, self.config.strangle_min_dte);
        info!(%scan_date, symbols = tickers.len(), ?expiry, "scan started");

        let (contexts, skipped) = self.scan_pass(&tickers);
        let filter_passers = contexts.iter().filter(|c| c.passes_filters()).count();

        let mut report = ScanReport {
            schema_version: SCHEMA_VERSION,
            scan_date,
            expiry,
            tier: None,
            tiers_attempted: Vec::new(),
            candidates: Vec::new(),
            starved: contexts.is_empty(),
            symbols_scanned: tickers.len(),
            symbols_with_data: contexts.len(),
            filter_passers,
            skipped,
            sectors: Vec::new(),
            config_hash: self.config.config_hash(),
        };

        if report.starved {
            warn!(symbols = tickers.len(), "no symbol yielded data, scan starved");
            return Ok(report);
        }

        report.sectors = sector_momentum(&contexts, self.config.sector_return_days);
        let strong = top_sectors(&report.sectors, self.config.top_sectors);

        let builder = CandidateBuilder::new(self.config, self.source, scan_date, expiry);
        let mut tier = Tier::Breakout;
        loop {
            report.tiers_attempted.push(tier);
            let candidates = self.run_tier(tier, &contexts, &builder);
            info!(%tier, candidates = candidates.len(), "tier finished");
            if !candidates.is_empty() {
                report.tier = Some(tier);
                report.candidates = candidates;
                break;
            }
            match tier.next() {
                Some(next) => tier = next,
                None => break,
            }
        }

        for candidate in &mut report.candidates {
            if candidate.sector.as_ref().is_some_and(|s| strong.contains(s)) {
                candidate.tags.push(TAG_TOP_SECTOR.to_string());
            }
        }
        rank_and_truncate(&mut report.candidates, self.config.top_n);

        info!(
            tier = ?report.tier,
            candidates = report.candidates.len(),
            with_data = report.symbols_with_data,
            passers = filter_passers,
            "scan finished"
        );
        Ok(report)
    }

    /// Fetch bars once per symbol and evaluate filters and detectors.
    pub fn scan_pass(&self, tickers: &[&str]) -> (Vec<SymbolContext>, Vec<SkippedSymbol>) {
        let mut contexts = Vec::with_capacity(tickers.len());
        let mut skipped = Vec::new();
        for &symbol in tickers {
            let Some(bars) = self.source.fetch_bars(symbol, self.config.lookback_days) else {
                debug!(symbol, "no data, skipping");
                skipped.push(SkippedSymbol {
                    symbol: symbol.to_string(),
                    reason: "no data".into(),
                });
                continue;
            };
            let ctx = SymbolContext::build(
                symbol,
                self.universe.sector_of(symbol),
                bars,
                self.config,
                &self.filters,
            );
            debug!(
                symbol,
                rsi = ctx.snapshot.rsi,
                adx = ctx.snapshot.adx,
                passed = ctx.passes_filters(),
                breakout = ?ctx.breakout,
                squeeze = ctx.squeeze_confirmed,
                "symbol evaluated"
            );
            contexts.push(ctx);
        }
        (contexts, skipped)
    }

    /// Candidates for one tier, with rank keys set. Unsorted.
    pub fn run_tier(
        &self,
        tier: Tier,
        contexts: &[SymbolContext],
        builder: &CandidateBuilder<'_, C>,
    ) -> Vec<Candidate> {
        match tier {
            Tier::Breakout => self.breakout_tier(contexts, builder),
            Tier::MomentumStrangle => self.momentum_strangle_tier(contexts, builder),
            Tier::CashMomentum => self.cash_momentum_tier(contexts, builder),
        }
    }

    fn breakout_tier(&self, contexts: &[SymbolContext], builder: &CandidateBuilder<'_, C>) -> Vec<Candidate> {
        let tier = Tier::Breakout;
        let sigmas = self.config.sigma_ladder(self.config.n_sigma_primary);
        let mut out = Vec::new();
        for ctx in contexts.iter().filter(|c| c.passes_filters()) {
            let Some(direction) = ctx.signal() else {
                continue;
            };
            let action = action_for(direction);
            out.extend(builder.cash(ctx, action, tier));
            out.extend(builder.futures(ctx, action, tier));
            match builder.strangle(ctx, tier, &sigmas) {
                Some(s) if s.pop >= self.config.popcut => out.push(s),
                Some(s) => debug!(symbol = %s.symbol, pop = s.pop, "strangle below popcut"),
                None => {}
            }
        }
        for c in &mut out {
            c.rank_key = c.pop;
        }
        out
    }

    fn momentum_strangle_tier(
        &self,
        contexts: &[SymbolContext],
        builder: &CandidateBuilder<'_, C>,
    ) -> Vec<Candidate> {
        let tier = Tier::MomentumStrangle;
        let sigmas = self.config.sigma_ladder(self.config.tier2_sigma);
        let passers: Vec<&SymbolContext> = contexts.iter().filter(|c| c.passes_filters()).collect();
        let mut out: Vec<Candidate> = top_by_rsi(passers, self.config.top_k_fallback)
            .into_iter()
            .filter_map(|ctx| builder.strangle(ctx, tier, &sigmas))
            .collect();
        for c in &mut out {
            c.rank_key = c.pop;
        }
        out
    }

    fn cash_momentum_tier(&self, contexts: &[SymbolContext], builder: &CandidateBuilder<'_, C>) -> Vec<Candidate> {
        let tier = Tier::CashMomentum;
        let mut out: Vec<Candidate> = top_by_rsi(contexts.iter().collect(), self.config.top_k_fallback)
            .into_iter()
            .filter_map(|ctx| builder.cash(ctx, TradeAction::Buy, tier))
            .collect();
        for c in &mut out {
            c.rank_key = c.rsi;
        }
        out
    }
}

/// The `k` contexts with the highest RSI, ties broken by symbol.
pub fn top_by_rsi(mut contexts: Vec<&SymbolContext>, k: usize) -> Vec<&SymbolContext> {
    contexts.sort_by(|a, b| {
        b.snapshot
            .rsi
            .total_cmp(&a.snapshot.rsi)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    contexts.truncate(k);
    contexts
}

/// Sort by rank key descending and keep the first `top_n`. Equal keys keep
/// a stable symbol/instrument order.
pub fn rank_and_truncate(candidates: &mut Vec<Candidate>, top_n: usize) {
    candidates.sort_by(|a, b| match b.rank_key.total_cmp(&a.rank_key) {
        Ordering::Equal => a
            .symbol
            .cmp(&b.symbol)
            .then_with(|| a.instrument_type.label().cmp(b.instrument_type.label())),
        other => other,
    });
    candidates.truncate(top_n);
}
