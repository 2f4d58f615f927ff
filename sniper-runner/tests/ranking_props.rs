//! Property tests for final ranking and the tier sigma ladder.

use chrono::NaiveDate;
use proptest::prelude::*;
use sniper_core::domain::{Candidate, CandidateId, InstrumentType, Tier, TradeAction};
use sniper_runner::{rank_and_truncate, ScanConfig};

fn candidate(i: usize, rank_key: f64) -> Candidate {
    let date = NaiveDate::from_ymd_opt(2025, 7, 14).unwrap();
    let symbol = format!("S{i:03}");
    Candidate {
        id: CandidateId::derive(date, &symbol, InstrumentType::Strangle, Tier::MomentumStrangle),
        scan_date: date,
        symbol,
        sector: None,
        instrument_type: InstrumentType::Strangle,
        action: TradeAction::Sell,
        entry: 10.0,
        strikes: None,
        stop: 20.0,
        target: 5.0,
        pop: rank_key,
        rsi: 50.0,
        tier: Tier::MomentumStrangle,
        tags: vec![],
        rank_key,
    }
}

proptest! {
    #[test]
    fn ranking_is_sorted_and_bounded(
        keys in prop::collection::vec(0.0..1.0_f64, 0..40),
        top_n in 1usize..15,
    ) {
        let mut cands: Vec<Candidate> = keys.iter().enumerate().map(|(i, k)| candidate(i, *k)).collect();
        rank_and_truncate(&mut cands, top_n);

        prop_assert_eq!(cands.len(), keys.len().min(top_n));
        for pair in cands.windows(2) {
            prop_assert!(pair[0].rank_key >= pair[1].rank_key);
        }
        // Nothing kept is worse than anything dropped
        let mut sorted = keys.clone();
        sorted.sort_by(|a, b| b.total_cmp(a));
        if let Some(last) = cands.last() {
            prop_assert_eq!(last.rank_key, sorted[cands.len() - 1]);
        }
    }

    #[test]
    fn ranking_is_idempotent(keys in prop::collection::vec(0.0..1.0_f64, 0..20)) {
        let mut once: Vec<Candidate> = keys.iter().enumerate().map(|(i, k)| candidate(i, *k)).collect();
        rank_and_truncate(&mut once, 10);
        let mut twice = once.clone();
        rank_and_truncate(&mut twice, 10);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn sigma_ladder_starts_at_first_and_widens(first in 0.5..2.0_f64) {
        let ladder = ScanConfig::default().sigma_ladder(first);
        prop_assert_eq!(ladder[0], first);
        for pair in ladder.windows(2) {
            prop_assert!(pair[1] > pair[0]);
        }
    }
}
