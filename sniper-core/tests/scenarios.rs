//! Reference scenarios for the indicator, detector and pricing layers.

use chrono::NaiveDate;
use sniper_core::components::{breakout_direction, donchian_high_low, in_squeeze_breakout, BreakoutDirection};
use sniper_core::domain::Bar;
use sniper_core::indicators::{adx, rsi, IndicatorSnapshot, RsiMode, SnapshotParams};
use sniper_core::options::{bs_delta, next_monthly_expiry};
use sniper_core::probability::{hist_pop, strangle_pop};

fn bars(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                symbol: "SCN".into(),
                date: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 0.5,
                low: open.min(close) - 0.5,
                close,
                volume: 100_000,
            }
        })
        .collect()
}

#[test]
fn uptrend_breaks_prior_twenty_bar_high() {
    let mut closes: Vec<f64> = (0..29).map(|i| 100.0 + 0.8 * i as f64).collect();
    closes.push(130.0);
    let series = bars(&closes);

    let (high, low) = donchian_high_low(&series, 20).unwrap();
    assert!(series.last().unwrap().close >= high);
    assert!(low < high);
    assert_eq!(breakout_direction(&series, 20), Some(BreakoutDirection::Up));
}

#[test]
fn flat_series_rsi_is_zero_sentinel() {
    let series = bars(&[250.0; 60]);
    for mode in [RsiMode::Simple, RsiMode::Wilder] {
        let value = rsi(&series, 14, mode);
        assert_eq!(value, 0.0);
        assert!(!value.is_nan());
    }
}

#[test]
fn atm_call_delta_matches_closed_form() {
    let t: f64 = 30.0 / 365.0;
    let d1 = (0.05 + 0.5 * 0.25 * 0.25) * t / (0.25 * t.sqrt());
    assert!((d1 - 0.093_174_6).abs() < 1e-6);

    let delta = bs_delta(100.0, 100.0, 30.0, true, 0.25, 0.05);
    assert!((delta - 0.534_91).abs() < 1e-3, "delta = {delta}");
    assert!(delta > 0.5);
}

#[test]
fn squeeze_boundary_length() {
    let closes: Vec<f64> = (0..24).map(|i| 100.0 + if i % 2 == 0 { 0.1 } else { -0.1 }).collect();
    let series = bars(&closes);
    assert_eq!(series.len(), 20 + 5 - 1);
    assert!(!in_squeeze_breakout(&series, 20, 5, BreakoutDirection::Up));
    assert!(!in_squeeze_breakout(&series, 20, 5, BreakoutDirection::Down));
}

#[test]
fn short_history_degrades_to_neutral() {
    let series = bars(&[100.0, 101.0, 102.0]);
    assert_eq!(adx(&series, 14), 0.0);
    assert_eq!(rsi(&series, 14, RsiMode::Wilder), 0.0);
    assert_eq!(breakout_direction(&series, 20), None);
    assert_eq!(hist_pop(&series[..1], 3.0, 2.0, 90), None);

    let snap = IndicatorSnapshot::compute(&series, &SnapshotParams::default());
    assert_eq!(snap.volume_ratio, 0.0);
    assert_eq!(snap.atr, 0.0);
}

#[test]
fn strangle_pop_from_deltas() {
    let call = bs_delta(1000.0, 1100.0, 30.0, true, 0.25, 0.05);
    let put = bs_delta(1000.0, 900.0, 30.0, false, 0.25, 0.05);
    let pop = strangle_pop(put, call);
    assert!(pop > 0.6 && pop < 1.0, "pop = {pop}");
}

#[test]
fn monthly_expiry_rolls_inside_window() {
    let today = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
    assert_eq!(
        next_monthly_expiry(today, 30),
        NaiveDate::from_ymd_opt(2025, 8, 28)
    );
}
