//! Probability-of-profit estimators.
//!
//! Historical PoP replays a fixed target/stop bracket one day ahead over the
//! recent past. A bar that touches both the target and the stop cannot be
//! ordered from daily data, so it is excluded, as is a bar that touches
//! neither.

use crate::domain::{Bar, TradeAction};
use serde::{Deserialize, Serialize};

/// Outcome counts behind a historical PoP.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistPopEstimate {
    pub pop: f64,
    pub wins: usize,
    pub losses: usize,
    /// Bars where both or neither threshold was touched.
    pub excluded: usize,
}

/// Win/loss tally over the last `lookback` bars (each needs a previous close
/// as entry). `None` when no bar had a determinable outcome.
pub fn hist_pop_detail(
    bars: &[Bar],
    target_pct: f64,
    stop_pct: f64,
    lookback: usize,
) -> Option<HistPopEstimate> {
    tally(bars, TradeAction::Buy, target_pct, stop_pct, lookback)
}

/// Historical PoP in [0, 1], `None` when nothing was decided.
pub fn hist_pop(bars: &[Bar], target_pct: f64, stop_pct: f64, lookback: usize) -> Option<f64> {
    hist_pop_detail(bars, target_pct, stop_pct, lookback).map(|e| e.pop)
}

/// Historical PoP for either side. A short position's target sits
/// `target_pct` below entry and its stop `stop_pct` above.
pub fn hist_pop_for(
    bars: &[Bar],
    action: TradeAction,
    target_pct: f64,
    stop_pct: f64,
    lookback: usize,
) -> Option<f64> {
    tally(bars, action, target_pct, stop_pct, lookback).map(|e| e.pop)
}

fn tally(
    bars: &[Bar],
    action: TradeAction,
    target_pct: f64,
    stop_pct: f64,
    lookback: usize,
) -> Option<HistPopEstimate> {
    if bars.len() < 2 || lookback == 0 {
        return None;
    }
    let first = bars.len().saturating_sub(lookback).max(1);

    let (mut wins, mut losses, mut excluded) = (0usize, 0usize, 0usize);
    for i in first..bars.len() {
        let entry = bars[i - 1].close;
        let bar = &bars[i];
        if !entry.is_finite() || bar.is_void() {
            excluded += 1;
            continue;
        }
        let (hit_target, hit_stop) = match action {
            TradeAction::Buy => (
                bar.high >= entry * (1.0 + target_pct / 100.0),
                bar.low <= entry * (1.0 - stop_pct / 100.0),
            ),
            TradeAction::Sell => (
                bar.low <= entry * (1.0 - target_pct / 100.0),
                bar.high >= entry * (1.0 + stop_pct / 100.0),
            ),
        };
        match (hit_target, hit_stop) {
            (true, false) => wins += 1,
            (false, true) => losses += 1,
            _ => excluded += 1,
        }
    }

    let decided = wins + losses;
    if decided == 0 {
        return None;
    }
    Some(HistPopEstimate {
        pop: wins as f64 / decided as f64,
        wins,
        losses,
        excluded,
    })
}

/// Probability that both short legs expire out of the money.
pub fn strangle_pop(delta_put: f64, delta_call: f64) -> f64 {
    let p = (1.0 - delta_put.abs()) * (1.0 - delta_call.abs());
    p.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_bars;

    #[test]
    fn counts_wins_losses_and_ambiguous() {
        // entry = previous close = 100; target 103, stop 98
        let bars = make_ohlc_bars(&[
            (100.0, 100.0, 100.0, 100.0),
            (100.0, 104.0, 99.0, 100.0), // win
            (100.0, 101.0, 97.0, 100.0), // loss
            (100.0, 104.0, 97.0, 100.0), // both → excluded
            (100.0, 101.0, 99.0, 100.0), // neither → excluded
            (100.0, 103.0, 98.5, 100.0), // win (target touched exactly)
        ]);
        let est = hist_pop_detail(&bars, 3.0, 2.0, 90).unwrap();
        assert_eq!((est.wins, est.losses, est.excluded), (2, 1, 2));
        assert!((est.pop - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn lookback_limits_window() {
        let bars = make_ohlc_bars(&[
            (100.0, 100.0, 100.0, 100.0),
            (100.0, 101.0, 97.0, 100.0), // loss, outside lookback
            (100.0, 104.0, 99.0, 100.0), // win
        ]);
        assert_eq!(hist_pop(&bars, 3.0, 2.0, 1), Some(1.0));
        assert_eq!(hist_pop(&bars, 3.0, 2.0, 2), Some(0.5));
    }

    #[test]
    fn no_decided_bars_is_none() {
        let bars = make_ohlc_bars(&[(100.0, 100.5, 99.5, 100.0); 10]);
        assert_eq!(hist_pop(&bars, 3.0, 2.0, 90), None);
        assert_eq!(hist_pop(&bars[..1], 3.0, 2.0, 90), None);
    }

    #[test]
    fn short_side_mirrors_bracket() {
        let bars = make_ohlc_bars(&[
            (100.0, 100.0, 100.0, 100.0),
            (100.0, 101.0, 96.5, 100.0), // short win: low <= 97
            (100.0, 102.5, 99.0, 100.0), // short loss: high >= 102
            (100.0, 104.0, 99.0, 100.0), // long win, short loss
        ]);
        assert_eq!(hist_pop_for(&bars, TradeAction::Sell, 3.0, 2.0, 90), Some(1.0 / 3.0));
        assert_eq!(
            hist_pop_for(&bars, TradeAction::Buy, 3.0, 2.0, 90),
            hist_pop(&bars, 3.0, 2.0, 90)
        );
    }

    #[test]
    fn strangle_pop_formula() {
        assert!((strangle_pop(-0.2, 0.1) - 0.72).abs() < 1e-12);
        assert_eq!(strangle_pop(0.0, 0.0), 1.0);
        assert_eq!(strangle_pop(-1.0, 0.3), 0.0);
    }
}
