//! Settlement alignment engine.
//!
//! Exchanges settle funding on different schedules (1h / 4h / 8h, offset
//! start times). To compare them, every qualifying source of a symbol is
//! projected onto each distinct upcoming settlement instant `T`, counting how
//! many settlements it realizes in `(now, T]`.

use std::sync::Arc;

use crate::adapters::types::{ContractFact, MS_PER_HOUR};
use crate::core::types::{LegProjection, SettlementProjection, SymbolView};

/// Minimum number of qualifying sources for a symbol to be compared
pub const MIN_SOURCES: usize = 2;

/// Number of settlements a source realizes between its next settlement and `target_ms`.
///
/// `1 + floor((target - next) / interval)` when `next <= target`, otherwise 0.
/// A non-positive interval counts the single known settlement.
#[inline]
pub fn settlement_count(next_settlement_ms: u64, interval_hours: f64, target_ms: u64) -> u32 {
    if next_settlement_ms > target_ms {
        return 0;
    }
    let interval_ms = (interval_hours * MS_PER_HOUR).round();
    if !(interval_ms.is_finite() && interval_ms >= 1.0) {
        return 1;
    }
    let elapsed = target_ms - next_settlement_ms;
    let whole = elapsed / interval_ms as u64;
    u32::try_from(whole).unwrap_or(u32::MAX - 1) + 1
}

/// Project one fact onto `target_ms`.
pub fn project_leg(source: &Arc<str>, fact: &ContractFact, target_ms: u64) -> LegProjection {
    let settlements =
        settlement_count(fact.next_settlement_ms, fact.funding_interval_hours, target_ms);
    let accumulated_rate = if settlements == 0 {
        0.0
    } else {
        fact.funding_rate * settlements as f64
    };

    LegProjection {
        source: source.clone(),
        price: fact.price,
        funding_rate: fact.funding_rate,
        interval_hours: fact.funding_interval_hours,
        next_settlement_ms: fact.next_settlement_ms,
        accumulated_rate,
        settlements,
    }
}

/// Distinct upcoming settlement instants of the qualifying facts, ascending.
pub fn candidate_instants<'a>(facts: impl IntoIterator<Item = &'a ContractFact>) -> Vec<u64> {
    let mut instants: Vec<u64> = facts.into_iter().map(|f| f.next_settlement_ms).collect();
    instants.sort_unstable();
    instants.dedup();
    instants
}

/// Project every qualifying source of `view` onto each candidate instant.
///
/// Returns nothing when fewer than two sources qualify at `now_ms`.
pub fn align(view: &SymbolView, now_ms: u64) -> Vec<SettlementProjection> {
    let qualifying: Vec<&(Arc<str>, ContractFact)> = view.qualifying(now_ms).collect();
    if qualifying.len() < MIN_SOURCES {
        return Vec::new();
    }

    candidate_instants(qualifying.iter().map(|(_, f)| f))
        .into_iter()
        .filter(|&target| target > now_ms)
        .map(|target| SettlementProjection {
            symbol: view.symbol.clone(),
            target_time_ms: target,
            legs: qualifying
                .iter()
                .map(|(source, fact)| project_leg(source, fact, target))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HOUR: u64 = 3_600_000;

    fn view(facts: Vec<(&str, ContractFact)>) -> SymbolView {
        SymbolView {
            symbol: Arc::from("BTCUSDT"),
            facts: facts
                .into_iter()
                .map(|(s, f)| (Arc::from(s), f))
                .collect(),
        }
    }

    #[test]
    fn test_settlement_count_examples() {
        let t0 = 1_700_000_000_000;
        // 8h interval, target 20h after the first settlement: t0, t0+8h, t0+16h
        assert_eq!(settlement_count(t0, 8.0, t0 + 20 * HOUR), 3);
        assert_eq!(settlement_count(t0, 8.0, t0), 1);
        assert_eq!(settlement_count(t0, 8.0, t0 + 8 * HOUR), 2);
        assert_eq!(settlement_count(t0, 8.0, t0 + 8 * HOUR - 1), 1);
        assert_eq!(settlement_count(t0, 1.0, t0 + 4 * HOUR), 5);
        assert_eq!(settlement_count(t0 + 1, 8.0, t0), 0);
    }

    #[test]
    fn test_settlement_count_bad_interval_counts_once() {
        assert_eq!(settlement_count(10, 0.0, 10 * HOUR), 1);
        assert_eq!(settlement_count(10, -4.0, 10 * HOUR), 1);
        assert_eq!(settlement_count(10, f64::NAN, 10 * HOUR), 1);
    }

    #[test]
    fn test_unsettled_leg_accumulates_zero() {
        let source: Arc<str> = Arc::from("okx");
        let negative = ContractFact::new("BTCUSDT", 100.0, -0.003, 8.0, 5 * HOUR);
        let leg = project_leg(&source, &negative, 4 * HOUR);
        assert_eq!(leg.settlements, 0);
        assert_eq!(leg.accumulated_rate, 0.0);
        assert_eq!(leg.funding_rate, -0.003);
    }

    #[test]
    fn test_single_qualifying_source_yields_nothing() {
        let now = 100 * HOUR;
        let v = view(vec![
            ("binance", ContractFact::new("BTCUSDT", 100.0, 0.001, 8.0, now + HOUR)),
            // Already settled
            ("okx", ContractFact::new("BTCUSDT", 100.0, 0.001, 8.0, now)),
            // Unknown schedule
            ("gate", ContractFact::new("BTCUSDT", 100.0, 0.001, 8.0, 0)),
        ]);
        assert!(align(&v, now).is_empty());
    }

    #[test]
    fn test_align_projects_every_source_on_every_instant() {
        let now = 100 * HOUR;
        let v = view(vec![
            ("binance", ContractFact::new("BTCUSDT", 100.0, 0.001, 8.0, now + 4 * HOUR)),
            ("bybit", ContractFact::new("BTCUSDT", 100.0, 0.0002, 1.0, now + HOUR)),
            ("okx", ContractFact::new("BTCUSDT", 100.0, 0.0005, 4.0, now + 4 * HOUR)),
        ]);

        let projections = align(&v, now);
        let targets: Vec<u64> = projections.iter().map(|p| p.target_time_ms).collect();
        assert_eq!(targets, vec![now + HOUR, now + 4 * HOUR]);

        // At now+1h only bybit has settled
        let first = &projections[0];
        assert_eq!(first.legs.len(), 3);
        let counts: Vec<u32> = first.legs.iter().map(|l| l.settlements).collect();
        assert_eq!(counts, vec![0, 1, 0]);

        // At now+4h bybit has settled 4 times
        let second = &projections[1];
        let bybit = second.legs.iter().find(|l| l.source.as_ref() == "bybit").unwrap();
        assert_eq!(bybit.settlements, 4);
        assert!((bybit.accumulated_rate - 0.0008).abs() < 1e-12);
    }

    #[test]
    fn test_candidate_instants_distinct_sorted() {
        let facts = [
            ContractFact::new("X", 1.0, 0.0, 8.0, 30),
            ContractFact::new("X", 1.0, 0.0, 8.0, 10),
            ContractFact::new("X", 1.0, 0.0, 8.0, 30),
        ];
        assert_eq!(candidate_instants(facts.iter()), vec![10, 30]);
    }

    proptest! {
        #[test]
        fn prop_settlement_count_matches_whole_intervals(
            next in 1u64..4_000_000_000_000,
            interval_idx in 0usize..4,
            whole in 0u64..200,
            frac in 0u64..3_600_000,
        ) {
            let hours = [1.0, 2.0, 4.0, 8.0][interval_idx];
            let interval_ms = (hours * MS_PER_HOUR) as u64;
            let offset = frac % interval_ms;
            let target = next + whole * interval_ms + offset;
            prop_assert_eq!(settlement_count(next, hours, target), whole as u32 + 1);
        }

        #[test]
        fn prop_accumulated_is_rate_times_count(
            rate in -0.01f64..0.01,
            whole in 0u64..50,
        ) {
            let source: Arc<str> = Arc::from("s");
            let fact = ContractFact::new("X", 1.0, rate, 8.0, 1_000);
            let leg = project_leg(&source, &fact, 1_000 + whole * 8 * HOUR);
            prop_assert_eq!(leg.accumulated_rate, rate * leg.settlements as f64);
        }

        #[test]
        fn prop_no_projection_at_or_before_now(
            offsets in proptest::collection::vec(0u64..48, 2..6),
        ) {
            let now = 1_000 * HOUR;
            let facts: Vec<(&str, ContractFact)> = offsets
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    let name = ["a", "b", "c", "d", "e", "f"][i];
                    (name, ContractFact::new("BTCUSDT", 100.0, 0.0001, 8.0, now + h * HOUR))
                })
                .collect();
            for projection in align(&view(facts), now) {
                prop_assert!(projection.target_time_ms > now);
            }
        }
    }
}
