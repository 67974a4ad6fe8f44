//! Core data types for the aggregation and opportunity detection pipeline.
//!
//! A cycle flows through these types in order: per-source `ContractMap`s are
//! merged into a `SourceTable`, transposed into `SymbolView`s, projected onto
//! settlement instants as `SettlementProjection`s and finally ranked into
//! `Opportunity`s.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::adapters::types::{ContractFact, ContractMap, MS_PER_HOUR};

// =============================================================================
// Source Table (all sources, one cycle)
// =============================================================================

/// `source -> {symbol -> ContractFact}` for one aggregation cycle.
///
/// Sources that failed during the cycle are simply absent.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    sources: BTreeMap<Arc<str>, ContractMap>,
}

impl SourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one source's snapshot, replacing any previous one.
    pub fn insert(&mut self, source: impl Into<Arc<str>>, contracts: ContractMap) {
        self.sources.insert(source.into(), contracts);
    }

    /// Snapshot reported by `source`
    pub fn get(&self, source: &str) -> Option<&ContractMap> {
        self.sources.get(source)
    }

    /// Names of the sources present, in sorted order
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.keys().map(|s| s.as_ref()).collect()
    }

    /// Number of sources that reported this cycle
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Total number of facts across all sources
    pub fn fact_count(&self) -> usize {
        self.sources.values().map(|m| m.len()).sum()
    }

    /// Transpose into one view per symbol, sorted by symbol.
    ///
    /// Within a view, facts are ordered by source name.
    pub fn symbol_views(&self) -> Vec<SymbolView> {
        let mut by_symbol: BTreeMap<&str, Vec<(Arc<str>, ContractFact)>> = BTreeMap::new();

        for (source, contracts) in &self.sources {
            for (symbol, fact) in contracts {
                by_symbol
                    .entry(symbol.as_str())
                    .or_default()
                    .push((source.clone(), fact.clone()));
            }
        }

        by_symbol
            .into_iter()
            .map(|(symbol, facts)| SymbolView {
                symbol: Arc::from(symbol),
                facts,
            })
            .collect()
    }
}

// =============================================================================
// Symbol View (one symbol, all sources)
// =============================================================================

/// One symbol as reported by every source in the current cycle.
#[derive(Debug, Clone)]
pub struct SymbolView {
    pub symbol: Arc<str>,
    /// `(source, fact)` pairs
    pub facts: Vec<(Arc<str>, ContractFact)>,
}

impl SymbolView {
    /// Facts usable for alignment at `now_ms`
    pub fn qualifying(&self, now_ms: u64) -> impl Iterator<Item = &(Arc<str>, ContractFact)> {
        self.facts.iter().filter(move |(_, f)| f.settles_after(now_ms))
    }
}

// =============================================================================
// Settlement Projection
// =============================================================================

/// One source's funding realized by a target instant.
#[derive(Debug, Clone, PartialEq)]
pub struct LegProjection {
    pub source: Arc<str>,
    pub price: f64,
    /// Per-settlement funding rate
    pub funding_rate: f64,
    pub interval_hours: f64,
    pub next_settlement_ms: u64,
    /// `funding_rate * settlements`
    pub accumulated_rate: f64,
    /// Settlements occurring in `(now, target]`
    pub settlements: u32,
}

/// All qualifying sources of one symbol projected to one candidate instant.
#[derive(Debug, Clone)]
pub struct SettlementProjection {
    pub symbol: Arc<str>,
    pub target_time_ms: u64,
    pub legs: Vec<LegProjection>,
}

// =============================================================================
// Opportunity
// =============================================================================

/// Dedup key: `(symbol, high_source, low_source)`, direction-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpportunityKey {
    pub symbol: Arc<str>,
    pub high_source: Arc<str>,
    pub low_source: Arc<str>,
}

impl std::fmt::Display for OpportunityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}_{}", self.symbol, self.high_source, self.low_source)
    }
}

/// Detected funding-rate arbitrage opportunity at one settlement instant.
///
/// Receive funding on the high leg, pay it on the low leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub symbol: Arc<str>,
    /// Source with the highest accumulated rate
    pub high_source: Arc<str>,
    /// Source with the lowest accumulated rate
    pub low_source: Arc<str>,
    /// Raw per-settlement rates
    pub high_rate: f64,
    pub low_rate: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub high_interval_hours: f64,
    pub low_interval_hours: f64,
    /// Accumulated rates at `target_time_ms`
    pub high_accumulated: f64,
    pub low_accumulated: f64,
    pub high_settlements: u32,
    pub low_settlements: u32,
    /// `(low_price - high_price) / high_price`
    pub price_spread: f64,
    /// `(high_accumulated - low_accumulated) - price_spread`
    pub net_profit: f64,
    pub target_time_ms: u64,
    pub time_to_target_hours: f64,
    pub generated_at_ms: u64,
}

impl Opportunity {
    /// Build from the extreme legs of a projection.
    pub fn from_legs(
        symbol: Arc<str>,
        target_time_ms: u64,
        high: &LegProjection,
        low: &LegProjection,
        now_ms: u64,
    ) -> Self {
        let price_spread = (low.price - high.price) / high.price;
        let net_profit = (high.accumulated_rate - low.accumulated_rate) - price_spread;

        Self {
            symbol,
            high_source: high.source.clone(),
            low_source: low.source.clone(),
            high_rate: high.funding_rate,
            low_rate: low.funding_rate,
            high_price: high.price,
            low_price: low.price,
            high_interval_hours: high.interval_hours,
            low_interval_hours: low.interval_hours,
            high_accumulated: high.accumulated_rate,
            low_accumulated: low.accumulated_rate,
            high_settlements: high.settlements,
            low_settlements: low.settlements,
            price_spread,
            net_profit,
            target_time_ms,
            time_to_target_hours: target_time_ms.saturating_sub(now_ms) as f64 / MS_PER_HOUR,
            generated_at_ms: now_ms,
        }
    }

    /// Cooldown ledger key
    pub fn key(&self) -> OpportunityKey {
        OpportunityKey {
            symbol: self.symbol.clone(),
            high_source: self.high_source.clone(),
            low_source: self.low_source.clone(),
        }
    }
}

// =============================================================================
// Utility
// =============================================================================

/// Get current time in milliseconds since epoch.
///
/// A clock before the epoch reads as 0.
#[inline]
pub fn current_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(symbol: &str, next: u64) -> ContractFact {
        ContractFact::new(symbol, 100.0, 0.0001, 8.0, next)
    }

    fn leg(source: &str, price: f64, accumulated: f64) -> LegProjection {
        LegProjection {
            source: Arc::from(source),
            price,
            funding_rate: accumulated,
            interval_hours: 8.0,
            next_settlement_ms: 1,
            accumulated_rate: accumulated,
            settlements: 1,
        }
    }

    #[test]
    fn test_symbol_views_transpose() {
        let mut table = SourceTable::new();
        table.insert(
            "okx",
            ContractMap::from([
                ("BTCUSDT".to_string(), fact("BTCUSDT", 10)),
                ("ETHUSDT".to_string(), fact("ETHUSDT", 10)),
            ]),
        );
        table.insert("binance", ContractMap::from([("BTCUSDT".to_string(), fact("BTCUSDT", 20))]));

        assert_eq!(table.len(), 2);
        assert_eq!(table.fact_count(), 3);
        assert_eq!(table.source_names(), vec!["binance", "okx"]);

        let views = table.symbol_views();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].symbol.as_ref(), "BTCUSDT");
        let sources: Vec<&str> = views[0].facts.iter().map(|(s, _)| s.as_ref()).collect();
        assert_eq!(sources, vec!["binance", "okx"]);
        assert_eq!(views[1].facts.len(), 1);
    }

    #[test]
    fn test_qualifying_filters_past_and_invalid() {
        let view = SymbolView {
            symbol: Arc::from("BTCUSDT"),
            facts: vec![
                (Arc::from("a"), fact("BTCUSDT", 100)),
                (Arc::from("b"), fact("BTCUSDT", 50)),
                (Arc::from("c"), ContractFact::new("BTCUSDT", 0.0, 0.0001, 8.0, 200)),
            ],
        };
        let names: Vec<&str> = view.qualifying(50).map(|(s, _)| s.as_ref()).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn test_opportunity_from_legs() {
        let high = leg("binance", 100.0, 0.001);
        let low = leg("okx", 99.0, -0.0005);
        let now = 1_000;
        let opp = Opportunity::from_legs(Arc::from("BTCUSDT"), now + 7_200_000, &high, &low, now);

        assert!((opp.price_spread + 0.01).abs() < 1e-12);
        assert!((opp.net_profit - 0.0115).abs() < 1e-12);
        assert!((opp.time_to_target_hours - 2.0).abs() < 1e-12);
        assert_eq!(opp.key().to_string(), "BTCUSDT_binance_okx");
    }

    #[test]
    fn test_key_is_direction_sensitive() {
        let a = leg("binance", 100.0, 0.001);
        let b = leg("okx", 100.0, -0.001);
        let forward = Opportunity::from_legs(Arc::from("BTCUSDT"), 10, &a, &b, 0);
        let reverse = Opportunity::from_legs(Arc::from("BTCUSDT"), 10, &b, &a, 0);
        assert_ne!(forward.key(), reverse.key());
    }

    #[test]
    fn test_opportunity_serialization() {
        let opp = Opportunity::from_legs(
            Arc::from("BTCUSDT"),
            10,
            &leg("binance", 100.0, 0.001),
            &leg("okx", 100.0, 0.0),
            0,
        );
        let json = serde_json::to_string(&opp).unwrap();
        assert!(json.contains("\"high_source\":\"binance\""));
        assert!(json.contains("\"symbol\":\"BTCUSDT\""));
    }

    #[test]
    fn test_current_time_ms() {
        let now = current_time_ms();
        // Should be after 2024-01-01
        assert!(now > 1_704_067_200_000);
    }
}
