//! Binance source implementation

use async_trait::async_trait;
use tracing::{debug, info};

use crate::adapters::binance::config::BinanceConfig;
use crate::adapters::binance::types::{BinanceFundingInfo, BinancePremiumIndex};
use crate::adapters::errors::ExchangeResult;
use crate::adapters::traits::FundingSource;
use crate::adapters::types::{
    create_http_client, get_json, ContractMap, ScheduleCache, ScheduleEntry,
    DEFAULT_FUNDING_INTERVAL_HOURS,
};

const PREMIUM_INDEX_PATH: &str = "/fapi/v1/premiumIndex";
const FUNDING_INFO_PATH: &str = "/fapi/v1/fundingInfo";

/// Binance USDⓈ-M perpetual funding source
pub struct BinanceAdapter {
    config: BinanceConfig,
    http: reqwest::Client,
    schedule: ScheduleCache,
}

impl BinanceAdapter {
    pub fn new(config: BinanceConfig) -> Self {
        Self {
            config,
            http: create_http_client("binance"),
            schedule: ScheduleCache::new(),
        }
    }

    /// Interval cache filled by `refresh_schedule`
    pub fn schedule(&self) -> &ScheduleCache {
        &self.schedule
    }
}

#[async_trait]
impl FundingSource for BinanceAdapter {
    fn name(&self) -> &'static str {
        "binance"
    }

    async fn initialize(&self) -> ExchangeResult<()> {
        Ok(())
    }

    async fn refresh_schedule(&self) -> ExchangeResult<()> {
        let infos: Vec<BinanceFundingInfo> =
            get_json(&self.http, &self.config.base_url, FUNDING_INFO_PATH).await?;

        let batch = infos
            .into_iter()
            .filter(|info| info.funding_interval_hours > 0)
            .map(|info| {
                let entry = ScheduleEntry::interval(info.funding_interval_hours as f64);
                (info.symbol, entry)
            });
        let updated = self.schedule.merge(batch).await;

        info!(exchange = "binance", symbols = updated, "Funding intervals refreshed");
        Ok(())
    }

    async fn fetch(&self) -> ExchangeResult<ContractMap> {
        let items: Vec<BinancePremiumIndex> =
            get_json(&self.http, &self.config.base_url, PREMIUM_INDEX_PATH).await?;
        let schedule = self.schedule.snapshot().await;

        let mut contracts = ContractMap::with_capacity(items.len());
        let mut skipped = 0usize;

        for item in &items {
            let Some(symbol) = item.canonical_symbol() else {
                continue;
            };
            let interval = schedule
                .get(&item.symbol)
                .map(|e| e.interval_hours)
                .unwrap_or(DEFAULT_FUNDING_INTERVAL_HOURS);

            match item.to_contract(symbol, interval) {
                Some(fact) => {
                    contracts.insert(fact.symbol.clone(), fact);
                }
                None => skipped += 1,
            }
        }

        debug!(
            exchange = "binance",
            contracts = contracts.len(),
            skipped = skipped,
            "Premium index parsed"
        );
        Ok(contracts)
    }
}
