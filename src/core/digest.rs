//! Plain-text digest of the opportunities selected by the gate.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::fmt::Write;

use crate::core::types::Opportunity;

/// Default display offset (UTC+8)
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

/// Renders selected opportunities into one notification message.
#[derive(Debug, Clone)]
pub struct DigestFormatter {
    offset: FixedOffset,
    threshold: f64,
}

impl DigestFormatter {
    /// Out-of-range offsets fall back to UTC.
    pub fn new(utc_offset_hours: i32, threshold: f64) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600)
            .unwrap_or_else(|| Utc.fix());
        Self { offset, threshold }
    }

    /// Target instant as `MM-DD HH:MM` in the display offset
    pub fn format_time(&self, epoch_ms: u64) -> String {
        match DateTime::<Utc>::from_timestamp_millis(epoch_ms as i64) {
            Some(utc) => utc.with_timezone(&self.offset).format("%m-%d %H:%M").to_string(),
            None => "--".to_string(),
        }
    }

    /// Build the digest: a header with the eligible count, then one block per selected opportunity.
    pub fn render(&self, eligible_count: usize, selected: &[Opportunity]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "🔔 {} arbitrage opportunities found\n", eligible_count);

        for opp in selected {
            let _ = writeln!(out, "[{}]", opp.symbol);
            let _ = writeln!(
                out,
                "Target: {} (in {:.2}h)",
                self.format_time(opp.target_time_ms),
                opp.time_to_target_hours
            );
            let _ = writeln!(
                out,
                "Net profit: {:.4}% (threshold: {:.2}%)",
                opp.net_profit * 100.0,
                self.threshold * 100.0
            );
            let _ = writeln!(
                out,
                "High: {}",
                leg_line(&opp.high_source, opp.high_rate, opp.high_settlements, opp.high_accumulated)
            );
            let _ = writeln!(
                out,
                "Low: {}",
                leg_line(&opp.low_source, opp.low_rate, opp.low_settlements, opp.low_accumulated)
            );
            let _ = writeln!(out, "Price spread: {:.4}%", opp.price_spread * 100.0);
            let _ = writeln!(out, "Prices: {:.4} / {:.4}\n", opp.high_price, opp.low_price);
        }

        out
    }
}

fn leg_line(source: &str, rate: f64, settlements: u32, accumulated: f64) -> String {
    if settlements == 0 {
        format!("{} 0% (not settled)", source)
    } else {
        format!(
            "{} {:.4}% × {} = {:.4}%",
            source,
            rate * 100.0,
            settlements,
            accumulated * 100.0
        )
    }
}
