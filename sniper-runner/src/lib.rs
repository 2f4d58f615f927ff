//! Sniper Runner: scan orchestration on top of `sniper-core`.
//!
//! - Scan configuration (TOML + tuner JSON overrides)
//! - Base filters over the indicator snapshot
//! - Candidate builder for cash, futures and strangle records
//! - Tier fallback state machine and final ranking
//! - Sector momentum tagging
//! - JSON scan report for the downstream ledger

pub mod builder;
pub mod config;
pub mod context;
pub mod filter;
pub mod ranker;
pub mod report;
pub mod sector;

pub use builder::{bracket, bracket_pcts, CandidateBuilder, TAG_DEFAULT_VOL, TAG_POP_UNAVAILABLE};
pub use config::{ConfigError, ScanConfig};
pub use context::SymbolContext;
pub use filter::{CandidateFilter, FilterChain, FilterVerdict};
pub use ranker::{rank_and_truncate, top_by_rsi, Ranker, ScanError, TAG_TOP_SECTOR};
pub use report::{write_json, ScanReport, SkippedSymbol};
pub use sector::{sector_momentum, top_sectors, SectorMomentum};
