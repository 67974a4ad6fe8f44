//! Gate source implementation

use async_trait::async_trait;
use tracing::{debug, info};

use crate::adapters::errors::ExchangeResult;
use crate::adapters::gate::config::GateConfig;
use crate::adapters::gate::types::{GateContract, GateTicker};
use crate::adapters::traits::FundingSource;
use crate::adapters::types::{
    create_http_client, get_json, parse_f64, pick_price, roll_forward, ContractFact, ContractMap,
    ScheduleCache, DEFAULT_FUNDING_INTERVAL_HOURS,
};
use crate::core::current_time_ms;

const CONTRACTS_PATH: &str = "/api/v4/futures/usdt/contracts";
const TICKERS_PATH: &str = "/api/v4/futures/usdt/tickers";

/// Gate.io USDT perpetual funding source
pub struct GateAdapter {
    config: GateConfig,
    http: reqwest::Client,
    schedule: ScheduleCache,
}

impl GateAdapter {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            http: create_http_client("gate"),
            schedule: ScheduleCache::new(),
        }
    }

    pub fn schedule(&self) -> &ScheduleCache {
        &self.schedule
    }
}

#[async_trait]
impl FundingSource for GateAdapter {
    fn name(&self) -> &'static str {
        "gate"
    }

    async fn initialize(&self) -> ExchangeResult<()> {
        Ok(())
    }

    async fn refresh_schedule(&self) -> ExchangeResult<()> {
        let contracts: Vec<GateContract> =
            get_json(&self.http, &self.config.base_url, CONTRACTS_PATH).await?;

        let batch = contracts
            .iter()
            .filter_map(|c| Some((c.canonical_symbol()?, c.schedule_entry()?)));
        let updated = self.schedule.merge(batch).await;

        info!(exchange = "gate", symbols = updated, "Funding schedule refreshed");
        Ok(())
    }

    async fn fetch(&self) -> ExchangeResult<ContractMap> {
        let tickers: Vec<GateTicker> =
            get_json(&self.http, &self.config.base_url, TICKERS_PATH).await?;
        let schedule = self.schedule.snapshot().await;
        let now = current_time_ms();

        let mut contracts = ContractMap::with_capacity(tickers.len());
        let mut skipped = 0usize;

        for ticker in &tickers {
            let Some(symbol) = ticker.canonical_symbol() else {
                continue;
            };
            let (Some(price), Some(rate)) = (
                pick_price(parse_f64(&ticker.last), parse_f64(&ticker.mark_price)),
                parse_f64(&ticker.funding_rate),
            ) else {
                skipped += 1;
                continue;
            };

            // Unknown schedule leaves the next settlement at 0 (excluded from alignment)
            let (interval, next) = match schedule.get(&symbol) {
                Some(entry) => (
                    entry.interval_hours,
                    roll_forward(entry.next_settlement_ms, entry.interval_hours, now),
                ),
                None => (DEFAULT_FUNDING_INTERVAL_HOURS, 0),
            };

            let fact = ContractFact::new(symbol, price, rate, interval, next);
            contracts.insert(fact.symbol.clone(), fact);
        }

        debug!(
            exchange = "gate",
            contracts = contracts.len(),
            skipped = skipped,
            "Tickers parsed"
        );
        Ok(contracts)
    }
}
