//! MarketDataSource: the scanner's only door to upstream data.
//!
//! Resolves symbols to instrument tokens, pushes every request through the
//! rate gate, retries throttled calls and turns every other failure into
//! `None`. Nothing above this layer ever sees a `DataError`.

use super::clock::Clock;
use super::instruments::InstrumentMap;
use super::provider::{equity_key, DataClient, Interval, RawBar};
use super::rate_gate::RateGate;
use super::rate_limited::RateLimitedClient;
use super::retry::RetryPolicy;
use crate::domain::{Bar, OptionChainSnapshot};
use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use tracing::debug;

pub struct MarketDataSource<C> {
    client: RateLimitedClient<C>,
    instruments: InstrumentMap,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
    as_of: NaiveDate,
}

impl<C: DataClient> MarketDataSource<C> {
    /// Wrap `client` in the shared gate. `as_of` is the last date requested.
    pub fn new(
        client: C,
        gate: Arc<RateGate>,
        clock: Arc<dyn Clock>,
        instruments: InstrumentMap,
        retry: RetryPolicy,
        as_of: NaiveDate,
    ) -> Self {
        Self {
            client: RateLimitedClient::new(client, gate),
            instruments,
            retry,
            clock,
            as_of,
        }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn instruments(&self) -> &InstrumentMap {
        &self.instruments
    }

    /// Daily bars covering the last `lookback_days` calendar days.
    ///
    /// `None` for unmapped symbols, exhausted throttling, any other upstream
    /// error, or an empty series.
    pub fn fetch_bars(&self, symbol: &str, lookback_days: u32) -> Option<Vec<Bar>> {
        let Some(token) = self.instruments.equity_token(symbol) else {
            debug!(symbol, "no instrument token, skipping");
            return None;
        };
        self.fetch_token_bars(symbol, token, lookback_days)
    }

    /// Bars for the symbol's futures contract, when the map lists one.
    pub fn fetch_futures_bars(&self, symbol: &str, lookback_days: u32) -> Option<Vec<Bar>> {
        let token = self.instruments.futures_token(symbol)?;
        self.fetch_token_bars(symbol, token, lookback_days)
    }

    fn fetch_token_bars(&self, symbol: &str, token: u64, lookback_days: u32) -> Option<Vec<Bar>> {
        let end = self.as_of;
        let start = end - Duration::days(i64::from(lookback_days));
        let what = format!("historical {symbol}");

        let raw = self
            .retry
            .run(self.clock.as_ref(), &what, || {
                self.client.historical_bars(token, start, end, Interval::Day)
            })
            .map_err(|e| debug!(symbol, error = %e, "bar fetch failed"))
            .ok()?;

        let bars = to_bars(symbol, raw);
        if bars.is_empty() {
            debug!(symbol, "empty bar series");
            return None;
        }
        Some(bars)
    }

    /// Last traded price of the cash equity.
    pub fn spot(&self, symbol: &str) -> Option<f64> {
        self.premium(&equity_key(symbol))
    }

    /// Last traded price of any exchange-qualified instrument key.
    pub fn premium(&self, instrument_key: &str) -> Option<f64> {
        let what = format!("ltp {instrument_key}");
        self.retry
            .run(self.clock.as_ref(), &what, || {
                self.client.last_traded_price(instrument_key)
            })
            .map_err(|e| debug!(instrument_key, error = %e, "quote failed"))
            .ok()
            .filter(|p| p.is_finite() && *p > 0.0)
    }

    /// Listed strikes for `expiry`. Premiums are left empty; fetch them per
    /// selected leg with [`MarketDataSource::price_legs`].
    pub fn option_chain(&self, symbol: &str, expiry: NaiveDate, today: NaiveDate) -> Option<OptionChainSnapshot> {
        let what = format!("option chain {symbol}");
        let chain = self
            .retry
            .run(self.clock.as_ref(), &what, || self.client.option_chain(symbol, expiry))
            .map_err(|e| debug!(symbol, error = %e, "option chain failed"))
            .ok()?;
        if chain.calls.is_empty() || chain.puts.is_empty() {
            debug!(symbol, %expiry, "no listed strikes");
            return None;
        }
        Some(OptionChainSnapshot::new(symbol, expiry, today, chain))
    }

    /// Quote each key and store the premium on the snapshot. Returns true
    /// when every leg was priced.
    pub fn price_legs(&self, snapshot: &mut OptionChainSnapshot, keys: &[&str]) -> bool {
        let mut all = true;
        for key in keys {
            match self.premium(key) {
                Some(p) => snapshot.set_premium(*key, p),
                None => all = false,
            }
        }
        all
    }
}

fn to_bars(symbol: &str, raw: Vec<RawBar>) -> Vec<Bar> {
    let mut bars: Vec<Bar> = raw
        .into_iter()
        .map(|r| Bar {
            symbol: symbol.to_string(),
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
        })
        .filter(Bar::is_sane)
        .collect();
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}
