//! Bitget source implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::adapters::bitget::config::BitgetConfig;
use crate::adapters::bitget::types::{BitgetFundingRate, BitgetResponse, BitgetTicker};
use crate::adapters::errors::ExchangeResult;
use crate::adapters::traits::FundingSource;
use crate::adapters::types::{
    create_http_client, get_json, parse_f64, pick_price, ContractFact, ContractMap,
    ScheduleCache, ScheduleEntry,
};

const FUNDING_RATE_PATH: &str = "/api/v2/mix/market/current-fund-rate?productType=USDT-FUTURES";
const TICKERS_PATH: &str = "/api/v2/mix/market/tickers?productType=USDT-FUTURES";

/// Bitget USDT-M perpetual funding source
pub struct BitgetAdapter {
    config: BitgetConfig,
    http: reqwest::Client,
    schedule: ScheduleCache,
}

impl BitgetAdapter {
    pub fn new(config: BitgetConfig) -> Self {
        Self {
            config,
            http: create_http_client("bitget"),
            schedule: ScheduleCache::new(),
        }
    }

    pub fn schedule(&self) -> &ScheduleCache {
        &self.schedule
    }

    async fn funding_rates(&self) -> ExchangeResult<Vec<BitgetFundingRate>> {
        let resp: BitgetResponse<BitgetFundingRate> =
            get_json(&self.http, &self.config.base_url, FUNDING_RATE_PATH).await?;
        resp.into_data()
    }

    async fn tickers(&self) -> ExchangeResult<Vec<BitgetTicker>> {
        let resp: BitgetResponse<BitgetTicker> =
            get_json(&self.http, &self.config.base_url, TICKERS_PATH).await?;
        resp.into_data()
    }
}

#[async_trait]
impl FundingSource for BitgetAdapter {
    fn name(&self) -> &'static str {
        "bitget"
    }

    async fn initialize(&self) -> ExchangeResult<()> {
        Ok(())
    }

    async fn refresh_schedule(&self) -> ExchangeResult<()> {
        let rates = self.funding_rates().await?;

        let batch = rates.iter().filter_map(|item| {
            let symbol = item.canonical_symbol()?;
            let interval = item.interval_hours()?;
            Some((
                symbol,
                ScheduleEntry {
                    interval_hours: interval,
                    next_settlement_ms: item.next_settlement_ms(),
                },
            ))
        });
        let updated = self.schedule.merge(batch).await;

        info!(exchange = "bitget", symbols = updated, "Funding intervals refreshed");
        Ok(())
    }

    async fn fetch(&self) -> ExchangeResult<ContractMap> {
        let (rates, tickers) = tokio::try_join!(self.funding_rates(), self.tickers())?;

        let prices: HashMap<&str, f64> = tickers
            .iter()
            .filter_map(|t| {
                let price = pick_price(parse_f64(&t.last_pr), parse_f64(&t.mark_price))?;
                Some((t.symbol.as_str(), price))
            })
            .collect();

        let mut contracts = ContractMap::with_capacity(rates.len());
        let mut skipped = 0usize;

        for item in &rates {
            let Some(symbol) = item.canonical_symbol() else {
                continue;
            };
            let (Some(price), Some(rate)) = (
                prices.get(item.symbol.as_str()).copied(),
                parse_f64(&item.funding_rate),
            ) else {
                skipped += 1;
                continue;
            };

            let interval = match item.interval_hours() {
                Some(observed) => {
                    self.schedule.set_interval(&symbol, observed).await;
                    observed
                }
                None => self.schedule.interval_hours(&symbol).await,
            };

            let fact = ContractFact::new(symbol, price, rate, interval, item.next_settlement_ms());
            contracts.insert(fact.symbol.clone(), fact);
        }

        debug!(
            exchange = "bitget",
            contracts = contracts.len(),
            skipped = skipped,
            "Funding rates parsed"
        );
        Ok(contracts)
    }
}
