//! MEXC source implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::adapters::errors::ExchangeResult;
use crate::adapters::mexc::config::MexcConfig;
use crate::adapters::mexc::types::{MexcFundingRate, MexcResponse, MexcTicker};
use crate::adapters::traits::FundingSource;
use crate::adapters::types::{
    create_http_client, get_json, pick_price, ContractFact, ContractMap, ScheduleCache,
    ScheduleEntry,
};

const FUNDING_RATE_PATH: &str = "/api/v1/contract/funding_rate";
const TICKER_PATH: &str = "/api/v1/contract/ticker";

/// MEXC USDT perpetual funding source
pub struct MexcAdapter {
    config: MexcConfig,
    http: reqwest::Client,
    schedule: ScheduleCache,
}

impl MexcAdapter {
    pub fn new(config: MexcConfig) -> Self {
        Self {
            config,
            http: create_http_client("mexc"),
            schedule: ScheduleCache::new(),
        }
    }

    pub fn schedule(&self) -> &ScheduleCache {
        &self.schedule
    }

    async fn funding_rates(&self) -> ExchangeResult<Vec<MexcFundingRate>> {
        let resp: MexcResponse<MexcFundingRate> =
            get_json(&self.http, &self.config.base_url, FUNDING_RATE_PATH).await?;
        resp.into_data()
    }

    async fn tickers(&self) -> ExchangeResult<Vec<MexcTicker>> {
        let resp: MexcResponse<MexcTicker> =
            get_json(&self.http, &self.config.base_url, TICKER_PATH).await?;
        resp.into_data()
    }
}

#[async_trait]
impl FundingSource for MexcAdapter {
    fn name(&self) -> &'static str {
        "mexc"
    }

    async fn initialize(&self) -> ExchangeResult<()> {
        Ok(())
    }

    async fn refresh_schedule(&self) -> ExchangeResult<()> {
        let rates = self.funding_rates().await?;

        let batch = rates.iter().filter_map(|item| {
            if item.collect_cycle == 0 {
                return None;
            }
            let symbol = item.canonical_symbol()?;
            Some((symbol, ScheduleEntry::interval(item.collect_cycle as f64)))
        });
        let updated = self.schedule.merge(batch).await;

        info!(exchange = "mexc", symbols = updated, "Funding intervals refreshed");
        Ok(())
    }

    async fn fetch(&self) -> ExchangeResult<ContractMap> {
        let (rates, tickers) = tokio::try_join!(self.funding_rates(), self.tickers())?;

        // (price, turnover) by exchange symbol
        let book: HashMap<&str, (f64, f64)> = tickers
            .iter()
            .filter_map(|t| {
                let price = pick_price(Some(t.last_price), Some(t.fair_price))?;
                Some((t.symbol.as_str(), (price, t.amount24)))
            })
            .collect();

        let mut contracts = ContractMap::with_capacity(rates.len());
        let mut illiquid = 0usize;

        for item in &rates {
            let Some(symbol) = item.canonical_symbol() else {
                continue;
            };
            let Some(&(price, turnover)) = book.get(item.symbol.as_str()) else {
                continue;
            };
            if turnover < self.config.min_turnover_24h {
                illiquid += 1;
                continue;
            }
            let Some(rate) = item.funding_rate.filter(|r| r.is_finite()) else {
                continue;
            };

            let interval = if item.collect_cycle > 0 {
                let observed = item.collect_cycle as f64;
                self.schedule.set_interval(&symbol, observed).await;
                observed
            } else {
                self.schedule.interval_hours(&symbol).await
            };

            let fact = ContractFact::new(symbol, price, rate, interval, item.next_settle_time);
            contracts.insert(fact.symbol.clone(), fact);
        }

        debug!(
            exchange = "mexc",
            contracts = contracts.len(),
            illiquid = illiquid,
            "Funding rates parsed"
        );
        Ok(contracts)
    }
}
