//! Candidate builder: turns a symbol context into cash, futures and
//! strangle trade records.

use crate::config::ScanConfig;
use crate::context::SymbolContext;
use chrono::NaiveDate;
use sniper_core::components::BreakoutDirection;
use sniper_core::data::{DataClient, MarketDataSource};
use sniper_core::domain::{Bar, Candidate, CandidateId, InstrumentType, StrangleLegs, Tier, TradeAction};
use sniper_core::indicators::atr;
use sniper_core::options::{bs_delta, select_with_fallback};
use sniper_core::probability::{hist_pop_for, strangle_pop};
use tracing::debug;

/// Tag set when no historical outcome could be decided and PoP is 0.0.
pub const TAG_POP_UNAVAILABLE: &str = "pop-unavailable";
/// Tag set when realized volatility was undefined and the configured
/// default was used for strike selection and deltas.
pub const TAG_DEFAULT_VOL: &str = "default-vol";

pub fn action_for(direction: BreakoutDirection) -> TradeAction {
    match direction {
        BreakoutDirection::Up => TradeAction::Buy,
        BreakoutDirection::Down => TradeAction::Sell,
    }
}

/// Stop and target around `entry`. ATR multiples when ATR is defined,
/// otherwise the fixed percentage bracket.
pub fn bracket(config: &ScanConfig, entry: f64, atr_value: f64, action: TradeAction) -> (f64, f64) {
    let (stop_dist, target_dist) = if atr_value > 0.0 {
        (config.atr_stop_mult * atr_value, config.atr_target_mult * atr_value)
    } else {
        (entry * config.stop_pct / 100.0, entry * config.target_pct / 100.0)
    };
    match action {
        TradeAction::Buy => (entry - stop_dist, entry + target_dist),
        TradeAction::Sell => (entry + stop_dist, entry - target_dist),
    }
}

/// (target %, stop %) distances of a bracket from `entry`, measured in the
/// direction of the trade.
pub fn bracket_pcts(entry: f64, stop: f64, target: f64, action: TradeAction) -> (f64, f64) {
    if entry <= 0.0 {
        return (0.0, 0.0);
    }
    let (target_dist, stop_dist) = match action {
        TradeAction::Buy => (target - entry, entry - stop),
        TradeAction::Sell => (entry - target, stop - entry),
    };
    (target_dist / entry * 100.0, stop_dist / entry * 100.0)
}

pub struct CandidateBuilder<'a, C> {
    config: &'a ScanConfig,
    source: &'a MarketDataSource<C>,
    scan_date: NaiveDate,
    expiry: Option<NaiveDate>,
}

impl<'a, C: DataClient> CandidateBuilder<'a, C> {
    pub fn new(
        config: &'a ScanConfig,
        source: &'a MarketDataSource<C>,
        scan_date: NaiveDate,
        expiry: Option<NaiveDate>,
    ) -> Self {
        Self {
            config,
            source,
            scan_date,
            expiry,
        }
    }

    pub fn cash(&self, ctx: &SymbolContext, action: TradeAction, tier: Tier) -> Option<Candidate> {
        let entry = ctx.last_close()?;
        let (stop, target) = bracket(self.config, entry, ctx.snapshot.atr, action);
        let pop = self.bracket_pop(&ctx.bars, action, entry, stop, target);
        Some(self.record(ctx, InstrumentType::Cash, action, tier, entry, stop, target, pop))
    }

    /// Futures record priced off the futures contract's own bars. `None`
    /// when the symbol has no listed future or its bars are unavailable.
    pub fn futures(&self, ctx: &SymbolContext, action: TradeAction, tier: Tier) -> Option<Candidate> {
        if !self.source.instruments().has_futures(&ctx.symbol) {
            return None;
        }
        let bars = self
            .source
            .fetch_futures_bars(&ctx.symbol, self.config.lookback_days)?;
        let entry = bars.last()?.close;
        let (stop, target) = bracket(self.config, entry, atr(&bars, self.config.atr_period), action);
        let pop = self.bracket_pop(&bars, action, entry, stop, target);
        Some(self.record(ctx, InstrumentType::Futures, action, tier, entry, stop, target, pop))
    }

    /// Short strangle at the first sigma multiple whose band fits the
    /// listed strikes. `None` without an expiry, a chain, or leg quotes.
    pub fn strangle(&self, ctx: &SymbolContext, tier: Tier, sigmas: &[f64]) -> Option<Candidate> {
        let symbol = ctx.symbol.as_str();
        let expiry = self.expiry?;
        let spot = self.source.spot(symbol).or_else(|| ctx.last_close())?;
        let mut chain = self.source.option_chain(symbol, expiry, self.scan_date)?;

        let (vol, default_vol) = match ctx.snapshot.realized_vol {
            Some(v) if v > 0.0 => (v, false),
            _ => (self.config.default_volatility, true),
        };

        let Some(selection) = select_with_fallback(&chain, spot, vol, sigmas) else {
            debug!(symbol, ?sigmas, "no listed strikes outside the band");
            return None;
        };
        if !self
            .source
            .price_legs(&mut chain, &[selection.call_key.as_str(), selection.put_key.as_str()])
        {
            debug!(symbol, "strangle legs could not be priced");
            return None;
        }
        let credit = chain.premium(&selection.call_key)? + chain.premium(&selection.put_key)?;

        let days = chain.days_to_expiry as f64;
        let rate = self.config.risk_free_rate;
        let delta_call = bs_delta(spot, selection.call_strike, days, true, vol, rate);
        let delta_put = bs_delta(spot, selection.put_strike, days, false, vol, rate);
        let pop = strangle_pop(delta_put, delta_call);

        let mut candidate = self.record(
            ctx,
            InstrumentType::Strangle,
            TradeAction::Sell,
            tier,
            credit,
            credit * self.config.strangle_stop_multiple,
            credit * (1.0 - self.config.strangle_target_capture),
            Some(pop),
        );
        candidate.strikes = Some(StrangleLegs {
            call_strike: selection.call_strike,
            put_strike: selection.put_strike,
            call_key: selection.call_key,
            put_key: selection.put_key,
            expiry,
        });
        candidate.tags.push(format!("sigma-{:.2}", selection.n_sigma));
        if default_vol {
            candidate.tags.push(TAG_DEFAULT_VOL.to_string());
        }
        Some(candidate)
    }

    /// Historical PoP replayed with the record's own stop and target.
    fn bracket_pop(&self, bars: &[Bar], action: TradeAction, entry: f64, stop: f64, target: f64) -> Option<f64> {
        let (target_pct, stop_pct) = bracket_pcts(entry, stop, target, action);
        hist_pop_for(bars, action, target_pct, stop_pct, self.config.pop_lookback)
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        ctx: &SymbolContext,
        instrument_type: InstrumentType,
        action: TradeAction,
        tier: Tier,
        entry: f64,
        stop: f64,
        target: f64,
        pop: Option<f64>,
    ) -> Candidate {
        let mut tags = vec![tier.to_string()];
        if pop.is_none() {
            tags.push(TAG_POP_UNAVAILABLE.to_string());
        }
        if let (Tier::Breakout, Some(dir)) = (tier, ctx.signal()) {
            tags.push(format!("breakout-{dir}"));
        }
        Candidate {
            id: CandidateId::derive(self.scan_date, &ctx.symbol, instrument_type, tier),
            scan_date: self.scan_date,
            symbol: ctx.symbol.clone(),
            sector: ctx.sector.clone(),
            instrument_type,
            action,
            entry,
            strikes: None,
            stop,
            target,
            pop: pop.unwrap_or(0.0).clamp(0.0, 1.0),
            rsi: ctx.snapshot.rsi,
            tier,
            tags,
            rank_key: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atr_bracket_follows_direction() {
        let config = ScanConfig::default();
        let (stop, target) = bracket(&config, 100.0, 2.0, TradeAction::Buy);
        assert_eq!((stop, target), (97.0, 105.0));
        let (stop, target) = bracket(&config, 100.0, 2.0, TradeAction::Sell);
        assert_eq!((stop, target), (103.0, 95.0));
    }

    #[test]
    fn percentage_bracket_without_atr() {
        let config = ScanConfig::default();
        let (stop, target) = bracket(&config, 200.0, 0.0, TradeAction::Buy);
        assert_eq!((stop, target), (196.0, 206.0));
    }

    #[test]
    fn bracket_pcts_measure_the_trade_direction() {
        let (target, stop) = bracket_pcts(100.0, 97.0, 105.0, TradeAction::Buy);
        assert!((target - 5.0).abs() < 1e-12);
        assert!((stop - 3.0).abs() < 1e-12);
        let (target, stop) = bracket_pcts(200.0, 206.0, 190.0, TradeAction::Sell);
        assert!((target - 5.0).abs() < 1e-12);
        assert!((stop - 3.0).abs() < 1e-12);
        assert_eq!(bracket_pcts(0.0, 1.0, 2.0, TradeAction::Buy), (0.0, 0.0));
    }

    #[test]
    fn direction_maps_to_action() {
        assert_eq!(action_for(BreakoutDirection::Up), TradeAction::Buy);
        assert_eq!(action_for(BreakoutDirection::Down), TradeAction::Sell);
    }
}
