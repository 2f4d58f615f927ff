//! Last-bar indicator readings for one symbol.

use crate::components::indicator::{Indicator, SENTINEL};
use crate::domain::Bar;
use crate::indicators::{
    adx, atr, average_turnover, iv_rank_proxy, macd, realized_volatility, rsi, volume_ratio,
    MacdParams, MacdValue, RsiMode, Sma,
};
use serde::{Deserialize, Serialize};

/// Periods used to build an [`IndicatorSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotParams {
    pub rsi_period: usize,
    pub rsi_mode: RsiMode,
    pub adx_period: usize,
    pub atr_period: usize,
    pub sma_period: usize,
    pub macd: MacdParams,
    pub vol_window: usize,
    /// Trailing readings considered by the IV-rank proxy.
    pub iv_rank_history: usize,
}

impl Default for SnapshotParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_mode: RsiMode::Wilder,
            adx_period: 14,
            atr_period: 14,
            sma_period: 20,
            macd: MacdParams::default(),
            vol_window: 20,
            iv_rank_history: 100,
        }
    }
}

/// Scalars for the last bar. Undefined readings are 0.0, except
/// `realized_vol` which stays `None` so callers can pick their own fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub rsi: f64,
    pub adx: f64,
    pub atr: f64,
    pub sma: f64,
    pub macd: MacdValue,
    pub volume_ratio: f64,
    pub avg_turnover: f64,
    pub realized_vol: Option<f64>,
    pub iv_rank: f64,
}

impl IndicatorSnapshot {
    pub fn compute(bars: &[Bar], params: &SnapshotParams) -> Self {
        let sma = if params.sma_period == 0 {
            SENTINEL
        } else {
            Sma::new(params.sma_period).last(bars)
        };

        Self {
            close: bars.last().map(|b| b.close).unwrap_or(SENTINEL),
            rsi: rsi(bars, params.rsi_period, params.rsi_mode),
            adx: adx(bars, params.adx_period),
            atr: atr(bars, params.atr_period),
            sma,
            macd: macd(bars, params.macd),
            volume_ratio: volume_ratio(bars, params.vol_window),
            avg_turnover: average_turnover(bars, params.vol_window),
            realized_vol: realized_volatility(bars, params.vol_window),
            iv_rank: iv_rank_proxy(bars, params.vol_window, params.iv_rank_history),
        }
    }
}
