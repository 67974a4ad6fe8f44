//! OKX Types
//!
//! All OKX v5 responses share the `{code, msg, data: [...]}` envelope and
//! carry numbers as strings.

use serde::Deserialize;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::types::{normalize_symbol, parse_ms, MS_PER_HOUR};

/// Instrument suffix of USDT-margined perpetual swaps
pub const USDT_SWAP_SUFFIX: &str = "-USDT-SWAP";

/// Response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct OkxResponse<T> {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub msg: String,
    /// Null or absent on some error replies
    pub data: Option<Vec<T>>,
}

impl<T> OkxResponse<T> {
    /// Unwrap the payload, mapping a non-zero code to an API error
    pub fn into_data(self) -> ExchangeResult<Vec<T>> {
        if self.code != "0" {
            return Err(ExchangeError::Api {
                code: self.code,
                message: self.msg,
            });
        }
        Ok(self.data.unwrap_or_default())
    }
}

/// Entry of `GET /api/v5/public/funding-rate`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxFundingRate {
    #[serde(default)]
    pub inst_id: String,
    #[serde(default)]
    pub funding_rate: String,
    #[serde(default)]
    pub funding_time: String,
    #[serde(default)]
    pub next_funding_time: String,
}

impl OkxFundingRate {
    /// `BTC-USDT-SWAP` → `BTCUSDT`
    pub fn canonical_symbol(&self) -> Option<String> {
        normalize_symbol(&self.inst_id, USDT_SWAP_SUFFIX)
    }

    /// Upcoming settlement, epoch ms. `nextFundingTime` is the one after it.
    pub fn next_settlement_ms(&self) -> u64 {
        parse_ms(&self.funding_time)
    }

    /// Interval implied by the current and next funding times, in hours
    pub fn observed_interval_hours(&self) -> Option<f64> {
        let funding_time = parse_ms(&self.funding_time);
        let next_funding_time = parse_ms(&self.next_funding_time);
        if funding_time > 0 && next_funding_time > funding_time {
            Some((next_funding_time - funding_time) as f64 / MS_PER_HOUR)
        } else {
            None
        }
    }
}

/// Entry of `GET /api/v5/market/tickers`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxTicker {
    #[serde(default)]
    pub inst_id: String,
    #[serde(default)]
    pub last: String,
    #[serde(default)]
    pub mark_px: String,
}
