//! Bitget Types (v2 mix market endpoints)

use serde::Deserialize;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::types::{normalize_symbol, parse_f64, parse_ms, QUOTE_ASSET};

/// Success code of every Bitget response
pub const SUCCESS_CODE: &str = "00000";

#[derive(Debug, Clone, Deserialize)]
pub struct BitgetResponse<T> {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub msg: String,
    /// Null or absent on some error replies
    pub data: Option<Vec<T>>,
}

impl<T> BitgetResponse<T> {
    pub fn into_data(self) -> ExchangeResult<Vec<T>> {
        if self.code != SUCCESS_CODE {
            return Err(ExchangeError::Api {
                code: self.code,
                message: self.msg,
            });
        }
        Ok(self.data.unwrap_or_default())
    }
}

/// One entry of `GET /api/v2/mix/market/current-fund-rate`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitgetFundingRate {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub funding_rate: String,
    /// Hours, e.g. "8"
    #[serde(default)]
    pub funding_rate_interval: String,
    /// Next settlement, epoch ms as string
    #[serde(default)]
    pub next_update: String,
}

impl BitgetFundingRate {
    pub fn canonical_symbol(&self) -> Option<String> {
        normalize_symbol(&self.symbol, QUOTE_ASSET)
    }

    pub fn interval_hours(&self) -> Option<f64> {
        parse_f64(&self.funding_rate_interval).filter(|h| *h > 0.0)
    }

    pub fn next_settlement_ms(&self) -> u64 {
        parse_ms(&self.next_update)
    }
}

/// One entry of `GET /api/v2/mix/market/tickers`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitgetTicker {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub last_pr: String,
    #[serde(default)]
    pub mark_price: String,
}
