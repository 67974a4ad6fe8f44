//! Binance Types
//!
//! REST response types for `/fapi/v1/premiumIndex` and `/fapi/v1/fundingInfo`.

use serde::Deserialize;

use crate::adapters::types::{normalize_symbol, parse_f64, ContractFact};

/// One entry of `GET /fapi/v1/premiumIndex`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinancePremiumIndex {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub mark_price: String,
    #[serde(default)]
    pub last_funding_rate: String,
    /// Epoch ms
    #[serde(default)]
    pub next_funding_time: u64,
}

impl BinancePremiumIndex {
    /// Canonical symbol, None for non-USDT contracts
    pub fn canonical_symbol(&self) -> Option<String> {
        normalize_symbol(&self.symbol, "USDT")
    }

    /// Convert to a contract fact; None when price or rate is unusable.
    pub fn to_contract(&self, symbol: String, interval_hours: f64) -> Option<ContractFact> {
        let price = parse_f64(&self.mark_price).filter(|p| *p > 0.0)?;
        let rate = parse_f64(&self.last_funding_rate)?;
        Some(ContractFact::new(
            symbol,
            price,
            rate,
            interval_hours,
            self.next_funding_time,
        ))
    }
}

/// One entry of `GET /fapi/v1/fundingInfo` (only symbols with adjusted settings)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceFundingInfo {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub funding_interval_hours: u64,
}
