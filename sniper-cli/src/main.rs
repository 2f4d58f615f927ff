//! Sniper CLI: scan, PoP, delta and expiry commands.
//!
//! Commands:
//! - `scan`: run the tiered scan over a universe and write candidates JSON
//! - `pop`: historical probability of profit for one symbol
//! - `delta`: Black-Scholes greeks for a single option
//! - `expiry`: next monthly expiry at least N days out
//!
//! Logging goes through `tracing`; set `RUST_LOG` to change the level.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sniper_core::data::{
    Clock, DataClient, InstrumentMap, KiteClient, KiteCredentials, MarketDataSource, RateGate,
    SyntheticClient, SystemClock, Universe,
};
use sniper_core::options::{next_monthly_expiry, Greeks};
use sniper_core::probability::hist_pop_detail;
use sniper_runner::{write_json, Ranker, ScanConfig, ScanReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exit code for a scan in which no symbol yielded data.
const EXIT_STARVED: i32 = 2;

#[derive(Parser)]
#[command(name = "sniper", about = "Sniper, a breakout and strangle scanner for NSE F&O")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the universe and rank trade candidates.
    Scan {
        /// Path to a TOML scan config. Defaults apply to missing keys.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Tuner parameter overrides (JSON, upper-case keys).
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// Universe TOML (sector → tickers). Defaults to the built-in NSE list.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Instrument token map (JSON). Defaults to the built-in table.
        #[arg(long)]
        instruments: Option<PathBuf>,

        /// Use deterministic synthetic data instead of the Kite API.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Scan date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Write the scan report as JSON.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Historical probability of profit for a bracket.
    Pop {
        symbol: String,

        /// Target, percent above entry.
        #[arg(long, default_value_t = 3.0)]
        target: f64,

        /// Stop, percent below entry.
        #[arg(long, default_value_t = 2.0)]
        stop: f64,

        /// Bars replayed.
        #[arg(long, default_value_t = 90)]
        lookback: usize,

        #[arg(long)]
        instruments: Option<PathBuf>,

        #[arg(long, default_value_t = false)]
        synthetic: bool,

        #[arg(long)]
        date: Option<String>,
    },
    /// Black-Scholes price and greeks.
    Delta {
        #[arg(long)]
        spot: f64,

        #[arg(long)]
        strike: f64,

        /// Calendar days to expiry.
        #[arg(long)]
        days: f64,

        /// Price a put instead of a call.
        #[arg(long, default_value_t = false)]
        put: bool,

        #[arg(long, default_value_t = 0.25)]
        vol: f64,

        #[arg(long, default_value_t = 0.05)]
        rate: f64,
    },
    /// Next monthly (last Thursday) expiry.
    Expiry {
        /// Roll to the following month when fewer days remain.
        #[arg(long, default_value_t = 30)]
        min_days: i64,

        #[arg(long)]
        date: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            config,
            overrides,
            universe,
            instruments,
            synthetic,
            date,
            output,
        } => run_scan(config, overrides, universe, instruments, synthetic, date, output),
        Commands::Pop {
            symbol,
            target,
            stop,
            lookback,
            instruments,
            synthetic,
            date,
        } => run_pop(&symbol, target, stop, lookback, instruments, synthetic, date),
        Commands::Delta {
            spot,
            strike,
            days,
            put,
            vol,
            rate,
        } => run_delta(spot, strike, days, put, vol, rate),
        Commands::Expiry { min_days, date } => run_expiry(min_days, date),
    }
}

fn parse_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD")),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn load_instruments(path: Option<&Path>) -> Result<InstrumentMap> {
    match path {
        Some(p) => Ok(InstrumentMap::from_file(p)?),
        None => Ok(InstrumentMap::default_nse()),
    }
}

/// Market data source over either the synthetic generator or Kite, with
/// the config's rate gate and retry policy.
fn build_source(
    config: &ScanConfig,
    instruments: InstrumentMap,
    synthetic: bool,
    as_of: NaiveDate,
) -> Result<MarketDataSource<Box<dyn DataClient>>> {
    let client: Box<dyn DataClient> = if synthetic {
        Box::new(
            SyntheticClient::new(instruments.clone(), as_of)
                .with_pricing(config.default_volatility, config.risk_free_rate),
        )
    } else {
        let credentials = KiteCredentials::from_env()?;
        Box::new(KiteClient::new(credentials)?)
    };
    info!(client = client.name(), %as_of, "data source ready");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let gate = Arc::new(RateGate::new(config.rate_gate(), clock.clone()));
    Ok(MarketDataSource::new(
        client,
        gate,
        clock,
        instruments,
        config.retry_policy(),
        as_of,
    ))
}

#[allow(clippy::too_many_arguments)]
fn run_scan(
    config_path: Option<PathBuf>,
    overrides: Option<PathBuf>,
    universe_path: Option<PathBuf>,
    instruments_path: Option<PathBuf>,
    synthetic: bool,
    date: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut config = match config_path {
        Some(p) => ScanConfig::from_file(&p)?,
        None => ScanConfig::default(),
    };
    if let Some(p) = overrides {
        config.apply_overrides_file(&p)?;
    }
    let universe = match universe_path {
        Some(p) => Universe::from_file(&p).map_err(|e| anyhow!(e))?,
        None => Universe::default_nse(),
    };
    let instruments = load_instruments(instruments_path.as_deref())?;
    let as_of = parse_date(date.as_deref())?;

    let source = build_source(&config, instruments, synthetic, as_of)?;
    let report = Ranker::new(&config, &source, &universe).run()?;

    print_report(&report);

    if let Some(path) = output {
        write_json(&path, &report)?;
        println!("Report saved to: {}", path.display());
    }

    if report.starved {
        eprintln!("No symbol returned data; scan starved.");
        std::process::exit(EXIT_STARVED);
    }
    Ok(())
}

fn print_report(report: &ScanReport) {
    let tier = report
        .tier
        .map(|t| t.to_string())
        .unwrap_or_else(|| "none".into());
    println!(
        "Scan {}  tier: {}  symbols: {}/{} with data, {} passed filters",
        report.scan_date,
        tier,
        report.symbols_with_data,
        report.symbols_scanned,
        report.filter_passers
    );
    if report.candidates.is_empty() {
        println!("No candidates.");
        return;
    }
    println!();
    println!(
        "{:<12} {:<9} {:<5} {:>10} {:>10} {:>10} {:>6} {:>6}  {}",
        "Symbol", "Type", "Side", "Entry", "Stop", "Target", "PoP", "RSI", "Strikes"
    );
    println!("{}", "-".repeat(90));
    for c in &report.candidates {
        let strikes = c
            .strikes
            .as_ref()
            .map(|s| format!("{}C / {}P", s.call_strike, s.put_strike))
            .unwrap_or_default();
        println!(
            "{:<12} {:<9} {:<5} {:>10.2} {:>10.2} {:>10.2} {:>6.2} {:>6.1}  {}",
            c.symbol,
            c.instrument_type.label(),
            c.action.to_string(),
            c.entry,
            c.stop,
            c.target,
            c.pop,
            c.rsi,
            strikes
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn run_pop(
    symbol: &str,
    target: f64,
    stop: f64,
    lookback: usize,
    instruments_path: Option<PathBuf>,
    synthetic: bool,
    date: Option<String>,
) -> Result<()> {
    if target <= 0.0 || stop <= 0.0 {
        bail!("--target and --stop must be positive percentages");
    }
    let config = ScanConfig::default();
    let instruments = load_instruments(instruments_path.as_deref())?;
    let as_of = parse_date(date.as_deref())?;
    let source = build_source(&config, instruments, synthetic, as_of)?;

    let bars = source
        .fetch_bars(symbol, history_days(lookback))
        .ok_or_else(|| anyhow!("no data for {symbol}"))?;

    match hist_pop_detail(&bars, target, stop, lookback) {
        Some(est) => println!(
            "{symbol}: PoP {:.2} ({} wins, {} losses, {} excluded over {} bars)",
            est.pop,
            est.wins,
            est.losses,
            est.excluded,
            lookback.min(bars.len().saturating_sub(1))
        ),
        None => println!("{symbol}: PoP unavailable (no decided bars)"),
    }
    Ok(())
}

/// Calendar days to request for `lookback` trading bars: twice over, to clear
/// weekends and holidays.
fn history_days(lookback: usize) -> u32 {
    u32::try_from(lookback.saturating_mul(2)).unwrap_or(u32::MAX)
}

fn run_delta(spot: f64, strike: f64, days: f64, put: bool, vol: f64, rate: f64) -> Result<()> {
    let greeks = Greeks::compute(spot, strike, days, !put, vol, rate);
    println!("{}", serde_json::to_string_pretty(&greeks)?);
    Ok(())
}

fn run_expiry(min_days: i64, date: Option<String>) -> Result<()> {
    let today = parse_date(date.as_deref())?;
    let expiry = next_monthly_expiry(today, min_days)
        .ok_or_else(|| anyhow!("no expiry found after {today}"))?;
    println!("{expiry} ({} days)", (expiry - today).num_days());
    Ok(())
}
