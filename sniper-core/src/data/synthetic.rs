//! Offline data client for dry runs.
//!
//! Each instrument token gets its own seeded random walk (seed = BLAKE3 of
//! the token), so repeated runs see identical data. Option chains are
//! laddered around the last close and quoted with Black-Scholes.

use super::instruments::InstrumentMap;
use super::provider::{DataClient, DataError, Interval, RawBar};
use crate::domain::{OptionChain, StrikeKey};
use crate::options::{bs_price, round_to_step};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Mutex;

/// Calendar days of history generated per instrument.
const HISTORY_DAYS: i64 = 730;
/// Strikes listed on each side of spot.
const LADDER_WIDTH: i64 = 40;

#[derive(Debug, Clone, Copy)]
struct ListedOption {
    spot: f64,
    strike: f64,
    days: f64,
    is_call: bool,
}

pub struct SyntheticClient {
    instruments: InstrumentMap,
    as_of: NaiveDate,
    strike_step: Option<f64>,
    volatility: f64,
    rate: f64,
    listed: Mutex<HashMap<String, ListedOption>>,
}

impl SyntheticClient {
    pub fn new(instruments: InstrumentMap, as_of: NaiveDate) -> Self {
        Self {
            instruments,
            as_of,
            strike_step: None,
            volatility: 0.25,
            rate: 0.05,
            listed: Mutex::new(HashMap::new()),
        }
    }

    /// Fixed strike interval instead of one derived from spot.
    pub fn with_strike_step(mut self, step: f64) -> Self {
        self.strike_step = (step > 0.0).then_some(step);
        self
    }

    pub fn with_pricing(mut self, volatility: f64, rate: f64) -> Self {
        self.volatility = volatility;
        self.rate = rate;
        self
    }

    fn path(&self, token: u64) -> Vec<RawBar> {
        let seed = blake3::hash(format!("synthetic:{token}").as_bytes());
        let mut rng = StdRng::from_seed(*seed.as_bytes());

        let mut price: f64 = rng.gen_range(100.0..3000.0);
        let mut bars = Vec::new();
        let mut current = self.as_of - Duration::days(HISTORY_DAYS);
        while current <= self.as_of {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += Duration::days(1);
                continue;
            }
            let daily_return: f64 = rng.gen_range(-0.02..0.021);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);
            bars.push(RawBar {
                date: current,
                open,
                high,
                low,
                close,
                volume,
            });
            price = close;
            current += Duration::days(1);
        }
        bars
    }

    fn last_close(&self, symbol: &str) -> Result<f64, DataError> {
        let token = self
            .instruments
            .equity_token(symbol)
            .ok_or_else(|| DataError::InstrumentNotFound {
                key: format!("NSE:{symbol}"),
            })?;
        self.path(token)
            .last()
            .map(|b| b.close)
            .ok_or_else(|| DataError::Other(format!("no synthetic history for {symbol}")))
    }

    fn step_for(&self, spot: f64) -> f64 {
        if let Some(step) = self.strike_step {
            return step;
        }
        let raw = spot / 40.0;
        [1.0, 2.5, 5.0, 10.0, 20.0, 50.0, 100.0]
            .into_iter()
            .find(|s| *s >= raw)
            .unwrap_or(100.0)
    }
}

impl DataClient for SyntheticClient {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn historical_bars(
        &self,
        instrument_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        _interval: Interval,
    ) -> Result<Vec<RawBar>, DataError> {
        Ok(self
            .path(instrument_id)
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect())
    }

    fn last_traded_price(&self, instrument_key: &str) -> Result<f64, DataError> {
        if let Some(symbol) = instrument_key.strip_prefix("NSE:") {
            return self.last_close(symbol);
        }
        let listed = self.listed.lock().unwrap_or_else(|e| e.into_inner());
        let opt = listed
            .get(instrument_key)
            .ok_or_else(|| DataError::InstrumentNotFound {
                key: instrument_key.to_string(),
            })?;
        Ok(bs_price(opt.spot, opt.strike, opt.days, opt.is_call, self.volatility, self.rate))
    }

    fn option_chain(&self, symbol: &str, expiry: NaiveDate) -> Result<OptionChain, DataError> {
        let spot = self.last_close(symbol)?;
        let step = self.step_for(spot);
        let atm = round_to_step(spot, step, false);
        let days = (expiry - self.as_of).num_days() as f64;
        let tag = expiry.format("%y%b").to_string().to_uppercase();

        let mut chain = OptionChain::default();
        let mut listed = self.listed.lock().unwrap_or_else(|e| e.into_inner());
        for i in -LADDER_WIDTH..=LADDER_WIDTH {
            let strike = atm + i as f64 * step;
            if strike <= 0.0 {
                continue;
            }
            for (is_call, kind) in [(true, "CE"), (false, "PE")] {
                let key = format!("NFO:{symbol}{tag}{strike}{kind}");
                listed.insert(
                    key.clone(),
                    ListedOption {
                        spot,
                        strike,
                        days,
                        is_call,
                    },
                );
                let side = if is_call { &mut chain.calls } else { &mut chain.puts };
                side.insert(StrikeKey::from_price(strike), key);
            }
        }
        Ok(chain)
    }
}
