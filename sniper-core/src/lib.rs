//! Sniper Core: domain types, indicators, detectors, option model and the
//! rate-limited data layer.
//!
//! - Domain types (bars, candidates, option chains)
//! - Indicator library with neutral sentinels for short history
//! - Donchian breakout and Bollinger/Keltner squeeze detectors
//! - Black-Scholes greeks and strangle strike selection
//! - Historical and delta-based probability of profit
//! - Rate gate, retry policy and market data source

pub mod components;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod options;
pub mod probability;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types shared across threads are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Candidate>();
        require_sync::<domain::Candidate>();
        require_send::<domain::OptionChainSnapshot>();
        require_sync::<domain::OptionChainSnapshot>();

        require_send::<data::RateGate>();
        require_sync::<data::RateGate>();
        require_send::<data::KiteClient>();
        require_sync::<data::KiteClient>();
        require_send::<data::SyntheticClient>();
        require_sync::<data::SyntheticClient>();
        require_send::<data::MarketDataSource<data::SyntheticClient>>();
        require_sync::<data::MarketDataSource<data::SyntheticClient>>();
    }

    /// The rate gate is the one piece of shared mutable state and must be
    /// usable through an `Arc` from several threads.
    #[test]
    fn rate_gate_shared_across_threads() {
        use std::sync::Arc;
        use std::time::Duration;

        let clock = Arc::new(data::ManualClock::new());
        let gate = Arc::new(data::RateGate::new(
            data::RateGateConfig {
                max_calls_per_sec: 100.0,
                max_calls_per_min: 100.0,
                quantum: Duration::from_millis(250),
            },
            clock,
        ));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        gate.admit();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(gate.in_flight(), (20, 20));
    }
}
