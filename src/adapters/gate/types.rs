//! Gate Types

use serde::Deserialize;

use crate::adapters::types::{normalize_symbol, ScheduleEntry};

pub const USDT_SUFFIX: &str = "_USDT";

/// One entry of `GET /api/v4/futures/usdt/contracts`
#[derive(Debug, Clone, Deserialize)]
pub struct GateContract {
    #[serde(default)]
    pub name: String,
    /// Seconds between settlements
    #[serde(default)]
    pub funding_interval: u64,
    /// Next settlement, epoch seconds
    #[serde(default)]
    pub funding_next_apply: f64,
}

impl GateContract {
    pub fn canonical_symbol(&self) -> Option<String> {
        normalize_symbol(&self.name, USDT_SUFFIX)
    }

    /// Schedule entry in hours and epoch ms; None without a usable interval.
    pub fn schedule_entry(&self) -> Option<ScheduleEntry> {
        if self.funding_interval == 0 {
            return None;
        }
        let next_apply = self.funding_next_apply;
        let next_settlement_ms = if next_apply.is_finite() && next_apply > 0.0 {
            (next_apply * 1000.0) as u64
        } else {
            0
        };
        Some(ScheduleEntry {
            interval_hours: self.funding_interval as f64 / 3600.0,
            next_settlement_ms,
        })
    }
}

/// One entry of `GET /api/v4/futures/usdt/tickers`
#[derive(Debug, Clone, Deserialize)]
pub struct GateTicker {
    #[serde(default)]
    pub contract: String,
    #[serde(default)]
    pub last: String,
    #[serde(default)]
    pub mark_price: String,
    #[serde(default)]
    pub funding_rate: String,
}

impl GateTicker {
    pub fn canonical_symbol(&self) -> Option<String> {
        normalize_symbol(&self.contract, USDT_SUFFIX)
    }
}
