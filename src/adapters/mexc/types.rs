//! MEXC Types
//!
//! Unlike most venues MEXC returns numbers as JSON numbers.

use serde::Deserialize;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::types::normalize_symbol;

/// Symbol suffix of USDT-margined contracts
pub const USDT_SUFFIX: &str = "_USDT";

/// `{success, code, data: [...]}` envelope
#[derive(Debug, Clone, Deserialize)]
pub struct MexcResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub code: i64,
    /// Null or absent on some error replies
    pub data: Option<Vec<T>>,
}

impl<T> MexcResponse<T> {
    pub fn into_data(self) -> ExchangeResult<Vec<T>> {
        if !self.success {
            return Err(ExchangeError::Api {
                code: self.code.to_string(),
                message: "success=false".to_string(),
            });
        }
        Ok(self.data.unwrap_or_default())
    }
}

/// One entry of `GET /api/v1/contract/funding_rate`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MexcFundingRate {
    #[serde(default)]
    pub symbol: String,
    pub funding_rate: Option<f64>,
    /// Hours between settlements
    #[serde(default)]
    pub collect_cycle: u32,
    /// Epoch ms
    #[serde(default)]
    pub next_settle_time: u64,
}

impl MexcFundingRate {
    /// `BTC_USDT` → `BTCUSDT`
    pub fn canonical_symbol(&self) -> Option<String> {
        normalize_symbol(&self.symbol, USDT_SUFFIX)
    }
}

/// One entry of `GET /api/v1/contract/ticker`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MexcTicker {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub last_price: f64,
    #[serde(default)]
    pub fair_price: f64,
    /// 24h turnover in quote currency
    #[serde(default)]
    pub amount24: f64,
}
