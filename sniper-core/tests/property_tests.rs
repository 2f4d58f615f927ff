//! Property tests for scanner invariants.
//!
//! Uses proptest to verify:
//! 1. RSI stays in [0, 100] and saturates at 100 on pure gains
//! 2. ADX is non-negative and 0 on short history
//! 3. The rate gate never admits more calls than either window allows
//! 4. BS delta is monotone in strike
//! 5. Historical PoP is in [0, 1] (or None) and idempotent
//! 6. Squeeze breakout is false one bar short of the required history

use chrono::NaiveDate;
use proptest::prelude::*;
use sniper_core::components::{in_squeeze_breakout, BreakoutDirection};
use sniper_core::data::{Clock, ManualClock, RateGate, RateGateConfig};
use sniper_core::domain::Bar;
use sniper_core::indicators::{adx, rsi, RsiMode};
use sniper_core::options::bs_delta;
use sniper_core::probability::hist_pop;
use std::sync::Arc;
use std::time::{Duration, Instant};

// ── Strategies (proptest) ────────────────────────────────────────────

fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                symbol: "PROP".into(),
                date: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * 1.01,
                low: open.min(close) * 0.99,
                close,
                volume: 1_000,
            }
        })
        .collect()
}

fn arb_closes(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(10.0..500.0_f64, 0..max_len)
}

fn arb_mode() -> impl Strategy<Value = RsiMode> {
    prop_oneof![Just(RsiMode::Simple), Just(RsiMode::Wilder)]
}

// ── 1. RSI bounds ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_within_bounds(closes in arb_closes(120), period in 2usize..30, mode in arb_mode()) {
        let value = rsi(&bars_from_closes(&closes), period, mode);
        prop_assert!((0.0..=100.0).contains(&value), "rsi = {}", value);
    }

    #[test]
    fn rsi_saturates_on_pure_gains(
        start in 10.0..500.0_f64,
        steps in prop::collection::vec(0.01..5.0_f64, 20..60),
        mode in arb_mode(),
    ) {
        let mut closes = vec![start];
        for s in &steps {
            let last = *closes.last().unwrap();
            closes.push(last + s);
        }
        let value = rsi(&bars_from_closes(&closes), 14, mode);
        prop_assert!((value - 100.0).abs() < 1e-9);
    }
}

// ── 2. ADX non-negativity ────────────────────────────────────────────

proptest! {
    #[test]
    fn adx_non_negative(closes in arb_closes(150), period in 2usize..20) {
        let bars = bars_from_closes(&closes);
        let value = adx(&bars, period);
        prop_assert!(value >= 0.0);
        if bars.len() < 2 * period {
            prop_assert_eq!(value, 0.0);
        }
    }
}

// ── 3. Rate gate window invariant ────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn rate_gate_never_exceeds_windows(
        per_sec in 1.0..5.0_f64,
        per_min in 3.0..40.0_f64,
        gaps_ms in prop::collection::vec(0u64..1500, 1..80),
    ) {
        let clock = Arc::new(ManualClock::new());
        let gate = RateGate::new(
            RateGateConfig {
                max_calls_per_sec: per_sec,
                max_calls_per_min: per_min,
                quantum: Duration::from_millis(250),
            },
            clock.clone(),
        );
        let (sec_cap, min_cap) = gate.ceilings();

        let mut admitted: Vec<Instant> = Vec::new();
        for gap in gaps_ms {
            clock.advance(Duration::from_millis(gap));
            gate.admit();
            admitted.push(clock.now());
        }

        for (i, t) in admitted.iter().enumerate() {
            let in_sec = admitted[..=i]
                .iter()
                .filter(|s| t.duration_since(**s) < Duration::from_secs(1))
                .count();
            let in_min = admitted[..=i]
                .iter()
                .filter(|s| t.duration_since(**s) < Duration::from_secs(60))
                .count();
            prop_assert!(in_sec <= sec_cap, "{} calls in 1s (cap {})", in_sec, sec_cap);
            prop_assert!(in_min <= min_cap, "{} calls in 60s (cap {})", in_min, min_cap);
        }
    }
}

// ── 4. BS delta monotonicity ─────────────────────────────────────────

proptest! {
    #[test]
    fn delta_monotone_in_strike(
        spot in 50.0..2000.0_f64,
        k1 in 0.5..1.5_f64,
        dk in 0.0..0.5_f64,
        days in 1.0..120.0_f64,
        vol in 0.05..1.0_f64,
    ) {
        let low = spot * k1;
        let high = spot * (k1 + dk);
        let call_low = bs_delta(spot, low, days, true, vol, 0.05);
        let call_high = bs_delta(spot, high, days, true, vol, 0.05);
        prop_assert!(call_high <= call_low + 1e-12);

        let put_low = bs_delta(spot, low, days, false, vol, 0.05);
        let put_high = bs_delta(spot, high, days, false, vol, 0.05);
        prop_assert!(put_high.abs() + 1e-12 >= put_low.abs());
        prop_assert!(put_high <= 0.0 && call_high >= 0.0);
    }
}

// ── 5. PoP range and idempotence ─────────────────────────────────────

proptest! {
    #[test]
    fn hist_pop_in_range_and_idempotent(
        closes in arb_closes(150),
        target in 0.5..5.0_f64,
        stop in 0.5..5.0_f64,
        lookback in 1usize..120,
    ) {
        let bars = bars_from_closes(&closes);
        let first = hist_pop(&bars, target, stop, lookback);
        let second = hist_pop(&bars, target, stop, lookback);
        prop_assert_eq!(first, second);
        if let Some(p) = first {
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }
}

// ── 6. Squeeze precondition ──────────────────────────────────────────

proptest! {
    #[test]
    fn squeeze_needs_full_history(
        window in 5usize..30,
        squeeze_bars in 1usize..8,
        closes in prop::collection::vec(90.0..110.0_f64, 40..41),
    ) {
        let n = window + squeeze_bars - 1;
        let bars = bars_from_closes(&closes[..n.min(closes.len())]);
        prop_assert!(!in_squeeze_breakout(&bars, window, squeeze_bars, BreakoutDirection::Up));
        prop_assert!(!in_squeeze_breakout(&bars, window, squeeze_bars, BreakoutDirection::Down));
    }
}
