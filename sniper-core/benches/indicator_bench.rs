//! Benchmarks for the per-symbol indicator pass.
//!
//! Measures:
//! - Full IndicatorSnapshot on one year of daily bars
//! - Squeeze breakout detection
//! - Historical PoP over a 90-bar lookback

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sniper_core::components::{in_squeeze_breakout, BreakoutDirection};
use sniper_core::domain::Bar;
use sniper_core::indicators::{IndicatorSnapshot, SnapshotParams};
use sniper_core::probability::hist_pop;

fn make_bars(n: usize) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut close = 1000.0_f64;
    (0..n)
        .map(|i| {
            let open = close;
            close *= 1.0 + 0.01 * ((i as f64) * 0.7).sin();
            Bar {
                symbol: "BENCH".into(),
                date: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * 1.005,
                low: open.min(close) * 0.995,
                close,
                volume: 1_000_000 + (i as u64 % 7) * 50_000,
            }
        })
        .collect()
}

fn bench_snapshot(c: &mut Criterion) {
    let bars = make_bars(252);
    let params = SnapshotParams::default();
    c.bench_function("indicator_snapshot_252", |b| {
        b.iter(|| IndicatorSnapshot::compute(black_box(&bars), black_box(&params)))
    });
}

fn bench_squeeze(c: &mut Criterion) {
    let bars = make_bars(252);
    c.bench_function("squeeze_breakout_252", |b| {
        b.iter(|| in_squeeze_breakout(black_box(&bars), 20, 5, BreakoutDirection::Up))
    });
}

fn bench_hist_pop(c: &mut Criterion) {
    let bars = make_bars(252);
    c.bench_function("hist_pop_90", |b| {
        b.iter(|| hist_pop(black_box(&bars), 3.0, 2.0, 90))
    });
}

criterion_group!(benches, bench_snapshot, bench_squeeze, bench_hist_pop);
criterion_main!(benches);
