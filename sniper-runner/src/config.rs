//! Scan configuration.
//!
//! Loaded from TOML; every field has a default so a partial file (or none at
//! all) works. A JSON parameter file written by the tuner can override the
//! headline thresholds on top.

use serde::{Deserialize, Serialize};
use sniper_core::data::{RateGateConfig, RetryPolicy};
use sniper_core::indicators::{MacdParams, RsiMode, SnapshotParams};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid overrides JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown override key '{0}'")]
    UnknownOverride(String),
    #[error("override '{key}' must be a number, got {value}")]
    BadOverride { key: String, value: String },
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Every tunable of a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    // Base filters
    pub rsi_min: f64,
    pub adx_min: f64,
    pub vol_multiplier: f64,
    pub iv_rank_min: f64,
    /// Average daily traded value (close × volume), rupees.
    pub min_turnover: f64,

    // Windows
    pub donchian_window: usize,
    pub squeeze_window: usize,
    pub squeeze_bars: usize,
    pub rsi_period: usize,
    pub rsi_mode: RsiMode,
    pub adx_period: usize,
    pub atr_period: usize,
    pub sma_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub vol_window: usize,
    pub lookback_days: u32,
    pub pop_lookback: usize,

    // Options
    pub n_sigma_primary: f64,
    pub sigma_fallbacks: Vec<f64>,
    pub tier2_sigma: f64,
    pub strangle_min_dte: i64,
    pub risk_free_rate: f64,
    pub default_volatility: f64,
    /// Fraction of the credit to keep before buying back.
    pub strangle_target_capture: f64,
    /// Premium multiple at which a strangle is abandoned.
    pub strangle_stop_multiple: f64,

    // Trade brackets
    pub target_pct: f64,
    pub stop_pct: f64,
    pub atr_stop_mult: f64,
    pub atr_target_mult: f64,

    // Ranking
    pub popcut: f64,
    pub top_n: usize,
    pub top_k_fallback: usize,
    pub top_sectors: usize,
    pub sector_return_days: usize,

    // Rate limits and retry
    pub max_calls_per_sec: f64,
    pub max_calls_per_min: f64,
    pub gate_quantum_ms: u64,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            rsi_min: 55.0,
            adx_min: 20.0,
            vol_multiplier: 1.5,
            iv_rank_min: 0.0,
            min_turnover: 5e8,

            donchian_window: 20,
            squeeze_window: 20,
            squeeze_bars: 5,
            rsi_period: 14,
            rsi_mode: RsiMode::Wilder,
            adx_period: 14,
            atr_period: 14,
            sma_period: 20,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            vol_window: 20,
            lookback_days: 120,
            pop_lookback: 90,

            n_sigma_primary: 1.0,
            sigma_fallbacks: vec![1.25, 1.5],
            tier2_sigma: 1.5,
            strangle_min_dte: 30,
            risk_free_rate: 0.05,
            default_volatility: 0.25,
            strangle_target_capture: 0.5,
            strangle_stop_multiple: 2.0,

            target_pct: 3.0,
            stop_pct: 2.0,
            atr_stop_mult: 1.5,
            atr_target_mult: 2.5,

            popcut: 0.60,
            top_n: 10,
            top_k_fallback: 5,
            top_sectors: 3,
            sector_return_days: 30,

            max_calls_per_sec: 1.2,
            max_calls_per_min: 70.0,
            gate_quantum_ms: 250,
            max_attempts: 5,
            base_delay_ms: 1000,
        }
    }
}

impl ScanConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("donchian_window", self.donchian_window),
            ("squeeze_window", self.squeeze_window),
            ("squeeze_bars", self.squeeze_bars),
            ("rsi_period", self.rsi_period),
            ("adx_period", self.adx_period),
            ("atr_period", self.atr_period),
            ("sma_period", self.sma_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("vol_window", self.vol_window),
            ("pop_lookback", self.pop_lookback),
            ("top_n", self.top_n),
        ];
        for (field, value) in periods {
            if value == 0 {
                return Err(invalid(field, "must be >= 1"));
            }
        }
        if self.macd_fast >= self.macd_slow {
            return Err(invalid("macd_fast", "must be shorter than macd_slow"));
        }
        if !(0.0..=1.0).contains(&self.popcut) {
            return Err(invalid("popcut", format!("{} is outside [0, 1]", self.popcut)));
        }
        if !(0.0..=100.0).contains(&self.rsi_min) {
            return Err(invalid("rsi_min", format!("{} is outside [0, 100]", self.rsi_min)));
        }
        if !(0.0..=100.0).contains(&self.iv_rank_min) {
            return Err(invalid("iv_rank_min", format!("{} is outside [0, 100]", self.iv_rank_min)));
        }
        if self.max_calls_per_sec <= 0.0 || self.max_calls_per_min <= 0.0 {
            return Err(invalid("max_calls_per_sec", "rate limits must be positive"));
        }
        if self.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be >= 1"));
        }
        if self.n_sigma_primary <= 0.0 || self.tier2_sigma <= 0.0 {
            return Err(invalid("n_sigma_primary", "sigma multiples must be positive"));
        }
        if self.sigma_fallbacks.iter().any(|s| *s <= 0.0 || !s.is_finite()) {
            return Err(invalid("sigma_fallbacks", "sigma multiples must be positive"));
        }
        if self.default_volatility <= 0.0 {
            return Err(invalid("default_volatility", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.strangle_target_capture) {
            return Err(invalid("strangle_target_capture", "must be in [0, 1]"));
        }
        if self.target_pct <= 0.0 || self.stop_pct <= 0.0 {
            return Err(invalid("target_pct", "target and stop percentages must be positive"));
        }
        Ok(())
    }

    /// Apply tuner overrides from a JSON object such as
    /// `{"RSI_MIN": 60, "POPCUT": 0.65}`. Validates the result.
    pub fn apply_overrides(&mut self, json: &str) -> Result<(), ConfigError> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        for (key, value) in &map {
            let number = value.as_f64().ok_or_else(|| ConfigError::BadOverride {
                key: key.clone(),
                value: value.to_string(),
            })?;
            match key.as_str() {
                "RSI_MIN" => self.rsi_min = number,
                "ADX_MIN" => self.adx_min = number,
                "VOL_MULTIPLIER" => self.vol_multiplier = number,
                "POPCUT" => self.popcut = number,
                "N_SIGMA_PRIMARY" => self.n_sigma_primary = number,
                "TOP_N" => self.top_n = as_count(key, number)?,
                "DONCHIAN_WINDOW" => self.donchian_window = as_count(key, number)?,
                _ => return Err(ConfigError::UnknownOverride(key.clone())),
            }
        }
        self.validate()
    }

    pub fn apply_overrides_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.apply_overrides(&content)
    }

    pub fn snapshot_params(&self) -> SnapshotParams {
        SnapshotParams {
            rsi_period: self.rsi_period,
            rsi_mode: self.rsi_mode,
            adx_period: self.adx_period,
            atr_period: self.atr_period,
            sma_period: self.sma_period,
            macd: MacdParams {
                fast: self.macd_fast,
                slow: self.macd_slow,
                signal: self.macd_signal,
            },
            vol_window: self.vol_window,
            ..SnapshotParams::default()
        }
    }

    pub fn rate_gate(&self) -> RateGateConfig {
        RateGateConfig {
            max_calls_per_sec: self.max_calls_per_sec,
            max_calls_per_min: self.max_calls_per_min,
            quantum: Duration::from_millis(self.gate_quantum_ms),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }

    /// Sigma multiples tried for a strangle starting at `first`: `first`
    /// followed by every configured fallback wider than it.
    pub fn sigma_ladder(&self, first: f64) -> Vec<f64> {
        let mut ladder = vec![first];
        ladder.extend(self.sigma_fallbacks.iter().copied().filter(|s| *s > first));
        ladder
    }

    /// Content hash of the full configuration, recorded on every report.
    pub fn config_hash(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn as_count(key: &str, value: f64) -> Result<usize, ConfigError> {
    if value.fract() != 0.0 || value < 0.0 {
        return Err(ConfigError::BadOverride {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value as usize)
}
