//! Trade candidates emitted by a scan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic candidate ID (hash of date + symbol + instrument type + tier).
///
/// Re-running a scan on the same day produces the same ID, which lets the
/// downstream ledger deduplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

impl CandidateId {
    pub fn derive(
        scan_date: NaiveDate,
        symbol: &str,
        instrument_type: InstrumentType,
        tier: Tier,
    ) -> Self {
        use serde_json::json;

        let canonical = json!({
            "date": scan_date.format("%Y-%m-%d").to_string(),
            "symbol": symbol,
            "type": instrument_type.label(),
            "tier": tier.number(),
        });
        let hash = blake3::hash(canonical.to_string().as_bytes());
        Self(hash.to_hex().to_string())
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentType {
    Cash,
    Futures,
    Strangle,
}

impl InstrumentType {
    pub fn label(self) -> &'static str {
        match self {
            InstrumentType::Cash => "Cash",
            InstrumentType::Futures => "Futures",
            InstrumentType::Strangle => "Strangle",
        }
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => f.write_str("Buy"),
            TradeAction::Sell => f.write_str("Sell"),
        }
    }
}

/// Fallback tier of a scan.
///
/// The ranker starts at `Breakout` and only moves to the next tier when the
/// current one produced nothing. The first non-empty tier wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// Tier 1: breakout + squeeze confirmed symbols.
    Breakout,
    /// Tier 2: strongest RSI names among filter passers, wide strangles.
    MomentumStrangle,
    /// Tier 3: strongest RSI names overall, cash only.
    CashMomentum,
}

impl Tier {
    pub fn next(self) -> Option<Tier> {
        match self {
            Tier::Breakout => Some(Tier::MomentumStrangle),
            Tier::MomentumStrangle => Some(Tier::CashMomentum),
            Tier::CashMomentum => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Tier::Breakout => 1,
            Tier::MomentumStrangle => 2,
            Tier::CashMomentum => 3,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier-{}", self.number())
    }
}

/// The two short legs of a strangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrangleLegs {
    pub call_strike: f64,
    pub put_strike: f64,
    pub call_key: String,
    pub put_key: String,
    pub expiry: NaiveDate,
}

/// A ranked trade suggestion.
///
/// For strangles `entry` is the combined premium credit, `target` the premium
/// to buy back at, `stop` the premium at which the trade is abandoned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub scan_date: NaiveDate,
    pub symbol: String,
    pub sector: Option<String>,
    pub instrument_type: InstrumentType,
    pub action: TradeAction,
    pub entry: f64,
    pub strikes: Option<StrangleLegs>,
    pub stop: f64,
    pub target: f64,
    /// Probability of profit, always in [0, 1].
    pub pop: f64,
    pub rsi: f64,
    pub tier: Tier,
    pub tags: Vec<String>,
    pub rank_key: f64,
}

impl Candidate {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
