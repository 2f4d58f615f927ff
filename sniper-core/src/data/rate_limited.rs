//! `DataClient` decorator that passes every upstream call through the shared
//! gate. Chain lookups the inner client can answer locally are not gated.

use super::provider::{DataClient, DataError, Interval, RawBar};
use super::rate_gate::RateGate;
use crate::domain::OptionChain;
use chrono::NaiveDate;
use std::sync::Arc;

pub struct RateLimitedClient<C> {
    inner: C,
    gate: Arc<RateGate>,
}

impl<C: DataClient> RateLimitedClient<C> {
    pub fn new(inner: C, gate: Arc<RateGate>) -> Self {
        Self { inner, gate }
    }
}

impl<C: DataClient> DataClient for RateLimitedClient<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn historical_bars(
        &self,
        instrument_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<RawBar>, DataError> {
        self.gate.admit();
        self.inner.historical_bars(instrument_id, start, end, interval)
    }

    fn last_traded_price(&self, instrument_key: &str) -> Result<f64, DataError> {
        self.gate.admit();
        self.inner.last_traded_price(instrument_key)
    }

    fn option_chain(&self, symbol: &str, expiry: NaiveDate) -> Result<OptionChain, DataError> {
        if !self.inner.chain_cached() {
            self.gate.admit();
        }
        self.inner.option_chain(symbol, expiry)
    }

    fn chain_cached(&self) -> bool {
        self.inner.chain_cached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::clock::ManualClock;
    use crate::data::rate_gate::RateGateConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingClient {
        calls: AtomicUsize,
        cached: bool,
    }

    impl DataClient for CountingClient {
        fn name(&self) -> &str {
            "counting"
        }

        fn historical_bars(
            &self,
            _instrument_id: u64,
            _start: NaiveDate,
            _end: NaiveDate,
            _interval: Interval,
        ) -> Result<Vec<RawBar>, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        fn last_traded_price(&self, _instrument_key: &str) -> Result<f64, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(100.0)
        }

        fn option_chain(&self, _symbol: &str, _expiry: NaiveDate) -> Result<OptionChain, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(OptionChain::default())
        }

        fn chain_cached(&self) -> bool {
            self.cached
        }
    }

    #[test]
    fn every_call_is_gated() {
        let clock = Arc::new(ManualClock::new());
        let gate = Arc::new(RateGate::new(RateGateConfig::default(), clock.clone()));
        let counting = Arc::new(CountingClient::default());
        let client = RateLimitedClient::new(counting.clone(), gate.clone());
        let d = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();

        client.historical_bars(1, d, d, Interval::Day).unwrap();
        client.last_traded_price("NSE:INFY").unwrap();
        client.option_chain("INFY", d).unwrap();

        assert_eq!(counting.calls.load(Ordering::SeqCst), 3);
        // one call per second at the default ceiling
        assert_eq!(clock.elapsed(), Duration::from_secs(2));
        assert_eq!(gate.in_flight().1, 3);
    }

    #[test]
    fn cached_chains_bypass_the_gate() {
        let clock = Arc::new(ManualClock::new());
        let gate = Arc::new(RateGate::new(RateGateConfig::default(), clock.clone()));
        let counting = Arc::new(CountingClient {
            cached: true,
            ..CountingClient::default()
        });
        let client = RateLimitedClient::new(counting.clone(), gate.clone());
        let d = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();

        for _ in 0..5 {
            client.option_chain("INFY", d).unwrap();
        }
        assert_eq!(counting.calls.load(Ordering::SeqCst), 5);
        assert_eq!(gate.in_flight().1, 0);
        assert_eq!(clock.elapsed(), Duration::ZERO);

        // bars still pay for a slot
        client.historical_bars(1, d, d, Interval::Day).unwrap();
        assert_eq!(gate.in_flight().1, 1);
    }
}
