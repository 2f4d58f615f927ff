//! Sector momentum: mean recent return and mean RSI per sector, computed
//! from bars already fetched for the scan.

use crate::context::SymbolContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sector used for symbols the universe does not place anywhere.
pub const UNMAPPED_SECTOR: &str = "Other";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorMomentum {
    pub sector: String,
    /// Mean percentage return over the window.
    pub avg_return: f64,
    /// Mean over members with a computed RSI; 0.0 when none has one.
    pub avg_rsi: f64,
    pub count: usize,
    /// 1 = strongest.
    pub rank: usize,
}

/// Percentage return over the last `days` bars, or over the whole series
/// when it is shorter. `None` below two bars.
pub fn trailing_return(closes: &[f64], days: usize) -> Option<f64> {
    if closes.len() < 2 || days == 0 {
        return None;
    }
    let start = closes[closes.len().saturating_sub(days + 1)];
    let end = closes[closes.len() - 1];
    if start <= 0.0 || !start.is_finite() || !end.is_finite() {
        return None;
    }
    Some((end / start - 1.0) * 100.0)
}

#[derive(Default)]
struct Group {
    ret_sum: f64,
    count: usize,
    rsi_sum: f64,
    rsi_count: usize,
}

/// Sectors ranked by mean return, strongest first. Ties break by name.
pub fn sector_momentum(contexts: &[SymbolContext], days: usize) -> Vec<SectorMomentum> {
    let mut groups: BTreeMap<&str, Group> = BTreeMap::new();
    for ctx in contexts {
        let closes: Vec<f64> = ctx.bars.iter().map(|b| b.close).collect();
        let Some(ret) = trailing_return(&closes, days) else {
            continue;
        };
        let sector = ctx.sector.as_deref().unwrap_or(UNMAPPED_SECTOR);
        let group = groups.entry(sector).or_default();
        group.ret_sum += ret;
        group.count += 1;
        // 0.0 is the short-history sentinel, not a reading
        let rsi = ctx.snapshot.rsi;
        if rsi.is_finite() && rsi > 0.0 {
            group.rsi_sum += rsi;
            group.rsi_count += 1;
        }
    }

    let mut ranking: Vec<SectorMomentum> = groups
        .into_iter()
        .map(|(sector, g)| SectorMomentum {
            sector: sector.to_string(),
            avg_return: g.ret_sum / g.count as f64,
            avg_rsi: if g.rsi_count == 0 {
                0.0
            } else {
                g.rsi_sum / g.rsi_count as f64
            },
            count: g.count,
            rank: 0,
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.avg_return
            .total_cmp(&a.avg_return)
            .then_with(|| a.sector.cmp(&b.sector))
    });
    for (i, s) in ranking.iter_mut().enumerate() {
        s.rank = i + 1;
    }
    ranking
}

pub fn top_sectors(ranking: &[SectorMomentum], n: usize) -> Vec<String> {
    ranking.iter().take(n).map(|s| s.sector.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::filter::FilterChain;
    use chrono::NaiveDate;
    use sniper_core::domain::Bar;

    fn ctx(symbol: &str, sector: Option<&str>, start: f64, end: f64) -> SymbolContext {
        ctx_n(symbol, sector, start, end, 31)
    }

    fn ctx_n(symbol: &str, sector: Option<&str>, start: f64, end: f64, n: usize) -> SymbolContext {
        let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let bars = (0..n)
            .map(|i| {
                let c = start + (end - start) * i as f64 / (n - 1) as f64;
                Bar {
                    symbol: symbol.into(),
                    date: base + chrono::Duration::days(i as i64),
                    open: c,
                    high: c,
                    low: c,
                    close: c,
                    volume: 100,
                }
            })
            .collect();
        SymbolContext::build(symbol, sector, bars, &ScanConfig::default(), &FilterChain::new(vec![]))
    }

    #[test]
    fn trailing_return_uses_window() {
        let last_bar = trailing_return(&[100.0, 200.0, 110.0], 1).unwrap();
        assert!((last_bar + 45.0).abs() < 1e-9);
        let whole = trailing_return(&[100.0, 110.0], 30).unwrap();
        assert!((whole - 10.0).abs() < 1e-9);
        assert_eq!(trailing_return(&[100.0], 30), None);
    }

    #[test]
    fn sectors_ranked_by_mean_return() {
        let contexts = vec![
            ctx("TCS", Some("IT"), 100.0, 110.0),
            ctx("INFY", Some("IT"), 100.0, 120.0),
            ctx("SBIN", Some("Banking"), 100.0, 95.0),
            ctx("ZZZ", None, 100.0, 200.0),
        ];
        let ranking = sector_momentum(&contexts, 30);
        let names: Vec<&str> = ranking.iter().map(|s| s.sector.as_str()).collect();
        assert_eq!(names, vec!["Other", "IT", "Banking"]);
        assert_eq!(ranking[1].count, 2);
        assert!((ranking[1].avg_return - 15.0).abs() < 1e-9);
        assert_eq!(ranking[2].rank, 3);
        assert_eq!(top_sectors(&ranking, 2), vec!["Other", "IT"]);
    }

    #[test]
    fn short_history_rsi_does_not_drag_the_sector_mean() {
        let contexts = vec![
            ctx("INFY", Some("IT"), 100.0, 120.0),
            ctx_n("TCS", Some("IT"), 100.0, 104.0, 5),
            ctx_n("SBIN", Some("Banking"), 100.0, 104.0, 5),
        ];
        assert_eq!(contexts[1].snapshot.rsi, 0.0);

        let ranking = sector_momentum(&contexts, 30);
        let it = ranking.iter().find(|s| s.sector == "IT").unwrap();
        assert_eq!(it.count, 2);
        assert!((it.avg_rsi - contexts[0].snapshot.rsi).abs() < 1e-9);
        assert!(it.avg_rsi > 50.0);
        let banking = ranking.iter().find(|s| s.sector == "Banking").unwrap();
        assert_eq!(banking.avg_rsi, 0.0);
    }
}
