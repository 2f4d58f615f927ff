//! Domain types for the scanner

pub mod bar;
pub mod candidate;
pub mod option_chain;

pub use bar::{closes, Bar};
pub use candidate::{Candidate, CandidateId, InstrumentType, StrangleLegs, Tier, TradeAction};
pub use option_chain::{OptionChain, OptionChainSnapshot, StrikeKey};

/// Symbol type alias
pub type Symbol = String;
