//! Bybit source implementation

use async_trait::async_trait;
use tracing::debug;

use crate::adapters::bybit::config::BybitConfig;
use crate::adapters::bybit::types::{BybitResponse, BybitTickerList};
use crate::adapters::errors::ExchangeResult;
use crate::adapters::traits::FundingSource;
use crate::adapters::types::{create_http_client, get_json, ContractMap};

const TICKERS_PATH: &str = "/v5/market/tickers?category=linear";

/// Bybit USDT linear perpetual funding source
pub struct BybitAdapter {
    config: BybitConfig,
    http: reqwest::Client,
}

impl BybitAdapter {
    pub fn new(config: BybitConfig) -> Self {
        Self {
            config,
            http: create_http_client("bybit"),
        }
    }
}

#[async_trait]
impl FundingSource for BybitAdapter {
    fn name(&self) -> &'static str {
        "bybit"
    }

    async fn initialize(&self) -> ExchangeResult<()> {
        Ok(())
    }

    /// Intervals arrive inline with every ticker, nothing to cache.
    async fn refresh_schedule(&self) -> ExchangeResult<()> {
        Ok(())
    }

    async fn fetch(&self) -> ExchangeResult<ContractMap> {
        let resp: BybitResponse<BybitTickerList> =
            get_json(&self.http, &self.config.base_url, TICKERS_PATH).await?;
        let tickers = resp.into_result()?.list;

        let mut contracts = ContractMap::with_capacity(tickers.len());
        for fact in tickers.iter().filter_map(|t| t.to_contract()) {
            contracts.insert(fact.symbol.clone(), fact);
        }

        debug!(
            exchange = "bybit",
            contracts = contracts.len(),
            received = tickers.len(),
            "Tickers parsed"
        );
        Ok(contracts)
    }
}
