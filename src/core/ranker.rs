//! Opportunity ranker.
//!
//! For every (symbol, instant) projection the legs with the lowest and highest
//! accumulated rate form a candidate. The candidate survives when its net
//! profit after the entry price spread strictly exceeds the threshold.

use std::cmp::Ordering;

use crate::core::alignment::align;
use crate::core::types::{Opportunity, SettlementProjection, SourceTable, SymbolView};

/// Default minimum net profit (0.4%)
pub const DEFAULT_THRESHOLD: f64 = 0.004;

/// Candidate opportunity for one projection, before thresholding.
///
/// None when fewer than two legs are present or the high leg has no usable price.
pub fn evaluate(projection: &SettlementProjection, now_ms: u64) -> Option<Opportunity> {
    if projection.legs.len() < 2 {
        return None;
    }

    let mut legs: Vec<_> = projection.legs.iter().collect();
    legs.sort_by(|a, b| a.accumulated_rate.total_cmp(&b.accumulated_rate));

    let low = legs.first()?;
    let high = legs.last()?;
    if high.price.is_nan() || high.price <= 0.0 {
        return None;
    }

    Some(Opportunity::from_legs(
        projection.symbol.clone(),
        projection.target_time_ms,
        high,
        low,
        now_ms,
    ))
}

/// Sort by net profit, best first.
pub fn sort_by_net_profit(opportunities: &mut [Opportunity]) {
    opportunities.sort_by(|a, b| {
        b.net_profit
            .partial_cmp(&a.net_profit)
            .unwrap_or(Ordering::Equal)
    });
}

/// Run alignment and ranking over a whole cycle.
///
/// Returns every opportunity with `net_profit > threshold`, best first.
pub fn rank(table: &SourceTable, now_ms: u64, threshold: f64) -> Vec<Opportunity> {
    rank_views(&table.symbol_views(), now_ms, threshold)
}

/// Same as [`rank`] over already transposed views.
pub fn rank_views(views: &[SymbolView], now_ms: u64, threshold: f64) -> Vec<Opportunity> {
    let mut opportunities: Vec<Opportunity> = views
        .iter()
        .flat_map(|view| align(view, now_ms))
        .filter_map(|projection| evaluate(&projection, now_ms))
        .filter(|opp| opp.net_profit > threshold)
        .collect();

    sort_by_net_profit(&mut opportunities);
    opportunities
}
