//! OKX source implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::adapters::errors::ExchangeResult;
use crate::adapters::okx::config::OkxConfig;
use crate::adapters::okx::types::{OkxFundingRate, OkxResponse, OkxTicker};
use crate::adapters::traits::FundingSource;
use crate::adapters::types::{
    create_http_client, get_json, parse_f64, pick_price, ContractFact, ContractMap, ScheduleCache,
    ScheduleEntry,
};

const FUNDING_RATE_PATH: &str = "/api/v5/public/funding-rate?instType=SWAP";
const TICKERS_PATH: &str = "/api/v5/market/tickers?instType=SWAP";

/// OKX USDT perpetual swap funding source
pub struct OkxAdapter {
    config: OkxConfig,
    http: reqwest::Client,
    schedule: ScheduleCache,
}

impl OkxAdapter {
    pub fn new(config: OkxConfig) -> Self {
        Self {
            config,
            http: create_http_client("okx"),
            schedule: ScheduleCache::new(),
        }
    }

    pub fn schedule(&self) -> &ScheduleCache {
        &self.schedule
    }

    async fn funding_rates(&self) -> ExchangeResult<Vec<OkxFundingRate>> {
        let resp: OkxResponse<OkxFundingRate> =
            get_json(&self.http, &self.config.base_url, FUNDING_RATE_PATH).await?;
        resp.into_data()
    }

    async fn tickers(&self) -> ExchangeResult<Vec<OkxTicker>> {
        let resp: OkxResponse<OkxTicker> =
            get_json(&self.http, &self.config.base_url, TICKERS_PATH).await?;
        resp.into_data()
    }
}

#[async_trait]
impl FundingSource for OkxAdapter {
    fn name(&self) -> &'static str {
        "okx"
    }

    async fn initialize(&self) -> ExchangeResult<()> {
        Ok(())
    }

    async fn refresh_schedule(&self) -> ExchangeResult<()> {
        let rates = self.funding_rates().await?;

        let batch = rates.iter().filter_map(|item| {
            let symbol = item.canonical_symbol()?;
            let interval = item.observed_interval_hours()?;
            Some((
                symbol,
                ScheduleEntry {
                    interval_hours: interval,
                    next_settlement_ms: item.next_settlement_ms(),
                },
            ))
        });
        let updated = self.schedule.merge(batch).await;

        info!(exchange = "okx", symbols = updated, "Funding intervals refreshed");
        Ok(())
    }

    async fn fetch(&self) -> ExchangeResult<ContractMap> {
        let (rates, tickers) = tokio::try_join!(self.funding_rates(), self.tickers())?;

        let prices: HashMap<&str, f64> = tickers
            .iter()
            .filter_map(|t| {
                let price = pick_price(parse_f64(&t.last), parse_f64(&t.mark_px))?;
                Some((t.inst_id.as_str(), price))
            })
            .collect();

        let mut contracts = ContractMap::with_capacity(rates.len());
        let mut skipped = 0usize;

        for item in &rates {
            let Some(symbol) = item.canonical_symbol() else {
                continue;
            };
            let (Some(price), Some(rate)) = (
                prices.get(item.inst_id.as_str()).copied(),
                parse_f64(&item.funding_rate),
            ) else {
                skipped += 1;
                continue;
            };

            // Every funding-rate response carries the live interval, keep the cache current.
            let interval = match item.observed_interval_hours() {
                Some(observed) => {
                    self.schedule.set_interval(&symbol, observed).await;
                    observed
                }
                None => self.schedule.interval_hours(&symbol).await,
            };

            let fact =
                ContractFact::new(symbol, price, rate, interval, item.next_settlement_ms());
            contracts.insert(fact.symbol.clone(), fact);
        }

        debug!(
            exchange = "okx",
            contracts = contracts.len(),
            skipped = skipped,
            "Funding rates parsed"
        );
        Ok(contracts)
    }
}
