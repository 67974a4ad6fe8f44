//! Bybit Types

use serde::Deserialize;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::types::{
    normalize_symbol, parse_f64, parse_ms, pick_price, ContractFact, QUOTE_ASSET,
};

/// v5 response envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitResponse<T> {
    #[serde(default)]
    pub ret_code: i64,
    #[serde(default)]
    pub ret_msg: String,
    pub result: Option<T>,
}

impl<T> BybitResponse<T> {
    pub fn into_result(self) -> ExchangeResult<T> {
        if self.ret_code != 0 {
            return Err(ExchangeError::Api {
                code: self.ret_code.to_string(),
                message: self.ret_msg,
            });
        }
        self.result
            .ok_or_else(|| ExchangeError::InvalidResponse("missing result".to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BybitTickerList {
    #[serde(default = "Vec::new")]
    pub list: Vec<BybitTicker>,
}

/// One entry of `GET /v5/market/tickers?category=linear`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitTicker {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub last_price: String,
    #[serde(default)]
    pub mark_price: String,
    #[serde(default)]
    pub funding_rate: String,
    #[serde(default)]
    pub next_funding_time: String,
    #[serde(default)]
    pub funding_interval_hour: String,
}

impl BybitTicker {
    pub fn to_contract(&self) -> Option<ContractFact> {
        let symbol = normalize_symbol(&self.symbol, QUOTE_ASSET)?;
        let price = pick_price(parse_f64(&self.last_price), parse_f64(&self.mark_price))?;
        let rate = parse_f64(&self.funding_rate)?;
        // Missing interval falls back to 8h inside ContractFact::new
        let interval = parse_f64(&self.funding_interval_hour).unwrap_or(0.0);
        Some(ContractFact::new(
            symbol,
            price,
            rate,
            interval,
            parse_ms(&self.next_funding_time),
        ))
    }
}
