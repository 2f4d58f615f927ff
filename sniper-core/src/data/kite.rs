//! Kite Connect v3 REST client.
//!
//! Historical candles, LTP quotes and the NFO instrument dump (for option
//! chains). Responses are parsed into the crate's own types; HTTP 429 and
//! Kite's "Too many requests" message map to `DataError::RateLimited`,
//! everything else to a non-retryable variant.

use super::provider::{DataClient, DataError, Interval, RawBar};
use crate::domain::{OptionChain, StrikeKey};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://api.kite.trade";
const TIMEOUT: Duration = Duration::from_secs(30);

/// API key + access token pair.
#[derive(Clone)]
pub struct KiteCredentials {
    pub api_key: String,
    pub access_token: String,
}

impl KiteCredentials {
    /// Read `KITE_API_KEY`/`ZERODHA_API_KEY` and
    /// `KITE_ACCESS_TOKEN`/`ZERODHA_ACCESS_TOKEN`, Kite names first.
    pub fn from_env() -> Result<Self, DataError> {
        let read = |primary: &str, fallback: &str| {
            std::env::var(primary)
                .or_else(|_| std::env::var(fallback))
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| {
                    DataError::AuthenticationRequired(format!("set {primary} or {fallback}"))
                })
        };
        Ok(Self {
            api_key: read("KITE_API_KEY", "ZERODHA_API_KEY")?,
            access_token: read("KITE_ACCESS_TOKEN", "ZERODHA_ACCESS_TOKEN")?,
        })
    }
}

impl std::fmt::Debug for KiteCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KiteCredentials")
            .field("api_key", &self.api_key)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    data: Option<T>,
    message: Option<String>,
    error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandleData {
    candles: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct LtpQuote {
    last_price: f64,
}

/// One row of the NFO instrument dump.
#[derive(Debug, Clone, Deserialize)]
pub struct NfoInstrument {
    pub instrument_token: u64,
    pub tradingsymbol: String,
    pub name: String,
    #[serde(default)]
    pub expiry: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub strike: Option<f64>,
    pub instrument_type: String,
    #[serde(default)]
    pub segment: String,
}

impl NfoInstrument {
    fn expiry_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.expiry.trim(), "%Y-%m-%d").ok()
    }
}

/// Parse the CSV instrument dump served at `/instruments/NFO`.
pub fn parse_instrument_dump(csv_text: &str) -> Result<Vec<NfoInstrument>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());
    reader
        .deserialize()
        .collect::<Result<Vec<NfoInstrument>, _>>()
        .map_err(|e| DataError::ResponseFormatChanged(format!("instrument dump: {e}")))
}

/// Calls and puts for one underlying/expiry out of the dump.
pub fn chain_from_dump(instruments: &[NfoInstrument], symbol: &str, expiry: NaiveDate) -> OptionChain {
    let mut chain = OptionChain::default();
    for inst in instruments {
        if inst.name != symbol || inst.expiry_date() != Some(expiry) {
            continue;
        }
        let Some(strike) = inst.strike.filter(|k| *k > 0.0).map(StrikeKey::from_price) else {
            continue;
        };
        let key = format!("NFO:{}", inst.tradingsymbol);
        match inst.instrument_type.as_str() {
            "CE" => {
                chain.calls.insert(strike, key);
            }
            "PE" => {
                chain.puts.insert(strike, key);
            }
            _ => {}
        }
    }
    chain
}

/// Parse a `data.candles` array: `[timestamp, open, high, low, close, volume, ...]`.
fn parse_candles(candles: Vec<Vec<serde_json::Value>>) -> Result<Vec<RawBar>, DataError> {
    let bad = |what: &str| DataError::ResponseFormatChanged(format!("candle {what}"));
    candles
        .into_iter()
        .map(|row| {
            if row.len() < 6 {
                return Err(bad("row too short"));
            }
            let ts = row[0].as_str().ok_or_else(|| bad("timestamp"))?;
            let date = ts
                .get(..10)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                .ok_or_else(|| bad("date"))?;
            let num = |i: usize| row[i].as_f64().ok_or_else(|| bad("price"));
            Ok(RawBar {
                date,
                open: num(1)?,
                high: num(2)?,
                low: num(3)?,
                close: num(4)?,
                volume: row[5].as_f64().map(|v| v.max(0.0) as u64).ok_or_else(|| bad("volume"))?,
            })
        })
        .collect()
}

fn envelope_error(status: reqwest::StatusCode, message: Option<String>, error_type: Option<String>) -> DataError {
    let message = message.unwrap_or_else(|| format!("HTTP {status}"));
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || message.to_ascii_lowercase().contains("too many requests")
    {
        return DataError::RateLimited(message);
    }
    match error_type.as_deref() {
        Some("TokenException") | Some("PermissionException") => {
            DataError::AuthenticationRequired(message)
        }
        _ if status == reqwest::StatusCode::FORBIDDEN => DataError::AuthenticationRequired(message),
        _ => DataError::Other(message),
    }
}

fn transport_error(e: reqwest::Error) -> DataError {
    if e.is_timeout() {
        DataError::Timeout(e.to_string())
    } else {
        DataError::NetworkUnreachable(e.to_string())
    }
}

pub struct KiteClient {
    http: reqwest::blocking::Client,
    credentials: KiteCredentials,
    base_url: String,
    /// NFO dump, fetched once per client.
    nfo_dump: Mutex<Option<Arc<[NfoInstrument]>>>,
}

impl KiteClient {
    pub fn new(credentials: KiteCredentials) -> Result<Self, DataError> {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(credentials: KiteCredentials, base_url: &str) -> Result<Self, DataError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| DataError::Other(format!("build HTTP client: {e}")))?;
        Ok(Self {
            http,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
            nfo_dump: Mutex::new(None),
        })
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::blocking::Response, DataError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "kite request");
        self.http
            .get(url)
            .query(query)
            .header("X-Kite-Version", "3")
            .header(
                "Authorization",
                format!("token {}:{}", self.credentials.api_key, self.credentials.access_token),
            )
            .send()
            .map_err(transport_error)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, DataError> {
        let resp = self.get(path, query)?;
        let status = resp.status();
        let envelope: Envelope<T> = resp
            .json()
            .map_err(|e| {
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    DataError::RateLimited(format!("HTTP {status}"))
                } else {
                    DataError::ResponseFormatChanged(format!("{path}: {e}"))
                }
            })?;
        if !status.is_success() || envelope.status != "success" {
            return Err(envelope_error(status, envelope.message, envelope.error_type));
        }
        envelope
            .data
            .ok_or_else(|| DataError::ResponseFormatChanged(format!("{path}: missing data")))
    }

    fn load_nfo_dump(&self) -> Result<Arc<[NfoInstrument]>, DataError> {
        let mut cache = self.nfo_dump.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(dump) = cache.as_ref() {
            return Ok(Arc::clone(dump));
        }
        let resp = self.get("/instruments/NFO", &[])?;
        let status = resp.status();
        if !status.is_success() {
            return Err(envelope_error(status, None, None));
        }
        let text = resp.text().map_err(transport_error)?;
        let dump: Arc<[NfoInstrument]> = parse_instrument_dump(&text)?.into();
        info!(rows = dump.len(), "loaded NFO instrument dump");
        *cache = Some(Arc::clone(&dump));
        Ok(dump)
    }
}

impl DataClient for KiteClient {
    fn name(&self) -> &str {
        "kite"
    }

    fn historical_bars(
        &self,
        instrument_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<RawBar>, DataError> {
        let path = format!("/instruments/historical/{instrument_id}/{}", interval.as_kite());
        let query = [
            ("from", format!("{} 00:00:00", start.format("%Y-%m-%d"))),
            ("to", format!("{} 23:59:59", end.format("%Y-%m-%d"))),
        ];
        let data: CandleData = self.get_json(&path, &query)?;
        parse_candles(data.candles)
    }

    fn last_traded_price(&self, instrument_key: &str) -> Result<f64, DataError> {
        let data: HashMap<String, LtpQuote> =
            self.get_json("/quote/ltp", &[("i", instrument_key.to_string())])?;
        data.get(instrument_key)
            .map(|q| q.last_price)
            .ok_or_else(|| DataError::InstrumentNotFound {
                key: instrument_key.to_string(),
            })
    }

    fn option_chain(&self, symbol: &str, expiry: NaiveDate) -> Result<OptionChain, DataError> {
        let dump = self.load_nfo_dump()?;
        let chain = chain_from_dump(&dump, symbol, expiry);
        if chain.is_empty() {
            return Err(DataError::InstrumentNotFound {
                key: format!("NFO:{symbol} {expiry}"),
            });
        }
        Ok(chain)
    }

    fn chain_cached(&self) -> bool {
        self.nfo_dump.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
instrument_token,exchange_token,tradingsymbol,name,last_price,expiry,strike,tick_size,lot_size,instrument_type,segment,exchange
12345,48,INFY25JUL1600CE,INFY,0,2025-07-31,1600,0.05,400,CE,NFO-OPT,NFO
12346,49,INFY25JUL1400PE,INFY,0,2025-07-31,1400,0.05,400,PE,NFO-OPT,NFO
12347,50,INFY25AUG1600CE,INFY,0,2025-08-28,1600,0.05,400,CE,NFO-OPT,NFO
12348,51,INFY25JULFUT,INFY,0,2025-07-31,0,0.05,400,FUT,NFO-FUT,NFO
12349,52,TCS25JUL3600CE,TCS,0,2025-07-31,3600,0.05,175,CE,NFO-OPT,NFO
";

    #[test]
    fn dump_parses_and_filters_chain() {
        let dump = parse_instrument_dump(DUMP).unwrap();
        assert_eq!(dump.len(), 5);
        let expiry = NaiveDate::from_ymd_opt(2025, 7, 31).unwrap();
        let chain = chain_from_dump(&dump, "INFY", expiry);
        assert_eq!(chain.calls.len(), 1);
        assert_eq!(chain.puts.len(), 1);
        assert_eq!(
            chain.calls.get(&StrikeKey::from_price(1600.0)).map(String::as_str),
            Some("NFO:INFY25JUL1600CE")
        );
    }

    fn offline_client() -> KiteClient {
        let credentials = KiteCredentials {
            api_key: "key".into(),
            access_token: "token".into(),
        };
        KiteClient::with_base_url(credentials, "http://127.0.0.1:9").unwrap()
    }

    #[test]
    fn loaded_dump_is_shared_and_serves_chains_offline() {
        let client = offline_client();
        assert!(!client.chain_cached());

        let dump: Arc<[NfoInstrument]> = parse_instrument_dump(DUMP).unwrap().into();
        *client.nfo_dump.lock().unwrap() = Some(Arc::clone(&dump));
        assert!(client.chain_cached());

        let first = client.load_nfo_dump().unwrap();
        let second = client.load_nfo_dump().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &dump));

        let expiry = NaiveDate::from_ymd_opt(2025, 7, 31).unwrap();
        let chain = client.option_chain("INFY", expiry).unwrap();
        assert_eq!(chain.calls.len(), 1);
        assert!(matches!(
            client.option_chain("SBIN", expiry),
            Err(DataError::InstrumentNotFound { .. })
        ));
    }

    #[test]
    fn candles_parse() {
        let json: serde_json::Value = serde_json::json!([
            ["2025-07-01T00:00:00+0530", 1500.0, 1520.5, 1490.0, 1510.0, 2000000],
            ["2025-07-02T00:00:00+0530", 1510, 1530, 1505, 1525, 1800000]
        ]);
        let candles: Vec<Vec<serde_json::Value>> = serde_json::from_value(json).unwrap();
        let bars = parse_candles(candles).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].high, 1520.5);
        assert_eq!(bars[1].volume, 1_800_000);
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2025, 7, 2).unwrap());
    }

    #[test]
    fn short_candle_rejected() {
        let candles = vec![vec![serde_json::json!("2025-07-01T00:00:00+0530")]];
        assert!(matches!(parse_candles(candles), Err(DataError::ResponseFormatChanged(_))));
    }

    #[test]
    fn throttle_classification() {
        let err = envelope_error(reqwest::StatusCode::TOO_MANY_REQUESTS, None, None);
        assert!(err.is_rate_limited());
        let err = envelope_error(
            reqwest::StatusCode::BAD_REQUEST,
            Some("Too many requests".into()),
            Some("NetworkException".into()),
        );
        assert!(err.is_rate_limited());
        let err = envelope_error(
            reqwest::StatusCode::FORBIDDEN,
            Some("Incorrect api_key or access_token.".into()),
            Some("TokenException".into()),
        );
        assert!(matches!(err, DataError::AuthenticationRequired(_)));
        let err = envelope_error(reqwest::StatusCode::BAD_REQUEST, Some("bad".into()), None);
        assert!(matches!(err, DataError::Other(_)));
    }
}
