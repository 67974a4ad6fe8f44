//! Source aggregator: concurrent fetch fan-out with per-source isolation.
//!
//! Every source's `fetch` runs as its own task in a `JoinSet`, each wrapped in
//! an individual timeout. The call returns only after every task has
//! produced a snapshot or a failure. Failed sources are absent from the
//! cycle's table.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::adapters::errors::ExchangeError;
use crate::adapters::traits::FundingSource;
use crate::core::types::SourceTable;

/// Default per-source fetch deadline
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 8_000;

/// One source that produced nothing this cycle.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub source: &'static str,
    pub reason: String,
}

/// Result of one fan-out.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub table: SourceTable,
    pub failures: Vec<SourceFailure>,
}

/// Fans `fetch` out to all sources and merges the results.
pub struct Aggregator<S> {
    sources: Vec<Arc<S>>,
    fetch_timeout: Duration,
}

impl<S: FundingSource + 'static> Aggregator<S> {
    pub fn new(sources: Vec<Arc<S>>, fetch_timeout: Duration) -> Self {
        Self {
            sources,
            fetch_timeout,
        }
    }

    pub fn sources(&self) -> &[Arc<S>] {
        &self.sources
    }

    /// Fetch every source concurrently and build the cycle's table.
    pub async fn run(&self) -> Aggregation {
        let started = Instant::now();
        let timeout = self.fetch_timeout;
        let timeout_ms = timeout.as_millis() as u64;

        let mut tasks = JoinSet::new();
        // Indexed by source position, so equal names stay distinct
        let mut reported = vec![false; self.sources.len()];

        for (index, source) in self.sources.iter().enumerate() {
            let source = Arc::clone(source);
            tasks.spawn(async move {
                let result = match tokio::time::timeout(timeout, source.fetch()).await {
                    Ok(result) => result,
                    Err(_) => Err(ExchangeError::NetworkTimeout(timeout_ms)),
                };
                (index, result)
            });
        }

        let mut aggregation = Aggregation::default();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(contracts))) => {
                    reported[index] = true;
                    let name = self.sources[index].name();
                    debug!(exchange = name, contracts = contracts.len(), "Source fetched");
                    aggregation.table.insert(name, contracts);
                }
                Ok((index, Err(e))) => {
                    reported[index] = true;
                    let name = self.sources[index].name();
                    warn!(exchange = name, error = %e, "Source fetch failed");
                    aggregation.failures.push(SourceFailure {
                        source: name,
                        reason: e.to_string(),
                    });
                }
                Err(join_err) => {
                    // Name is recovered below from the sources that never reported
                    error!(error = %join_err, "Source task aborted");
                }
            }
        }

        let unreported = reported.iter().enumerate().filter(|(_, done)| !**done);
        for (index, _) in unreported {
            let name = self.sources[index].name();
            error!(exchange = name, "Source task panicked");
            aggregation.failures.push(SourceFailure {
                source: name,
                reason: "task panicked".to_string(),
            });
        }

        debug!(
            ok = aggregation.table.len(),
            failed = aggregation.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Aggregation complete"
        );
        aggregation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_utils::TestMockSource;
    use crate::adapters::types::ContractFact;

    fn btc(next: u64) -> ContractFact {
        ContractFact::new("BTCUSDT", 100.0, 0.0001, 8.0, next)
    }

    #[tokio::test]
    async fn test_all_sources_merged() {
        let sources = vec![
            Arc::new(TestMockSource::new("binance").with_contract(btc(1))),
            Arc::new(TestMockSource::new("okx").with_contract(btc(2))),
        ];
        let aggregator = Aggregator::new(sources.clone(), Duration::from_secs(1));

        let result = aggregator.run().await;
        assert_eq!(result.table.len(), 2);
        assert!(result.failures.is_empty());
        assert!(sources.iter().all(|s| s.fetch_count() == 1));
    }

    #[tokio::test]
    async fn test_failing_source_isolated() {
        let sources = vec![
            Arc::new(TestMockSource::new("binance").with_contract(btc(1))),
            Arc::new(TestMockSource::failing("okx")),
        ];
        let result = Aggregator::new(sources, Duration::from_secs(1)).run().await;

        assert_eq!(result.table.source_names(), vec!["binance"]);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].source, "okx");
        assert!(result.failures[0].reason.contains("Mock failure"));
    }

    #[tokio::test]
    async fn test_slow_source_times_out() {
        let sources = vec![
            Arc::new(TestMockSource::new("binance").with_contract(btc(1))),
            Arc::new(
                TestMockSource::new("gate")
                    .with_contract(btc(1))
                    .with_delay(Duration::from_secs(5)),
            ),
        ];
        let started = Instant::now();
        let result = Aggregator::new(sources, Duration::from_millis(50)).run().await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(result.table.len(), 1);
        assert_eq!(result.failures[0].source, "gate");
        assert!(result.failures[0].reason.contains("50ms"));
    }

    #[tokio::test]
    async fn test_panic_attributed_among_equal_names() {
        let sources = vec![
            Arc::new(TestMockSource::new("mirror").with_contract(btc(1))),
            Arc::new(TestMockSource::panicking("mirror")),
            Arc::new(TestMockSource::new("bybit").with_contract(btc(1))),
        ];
        let result = Aggregator::new(sources, Duration::from_secs(1)).run().await;

        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].source, "mirror");
        assert_eq!(result.failures[0].reason, "task panicked");
        assert!(result.table.source_names().contains(&"bybit"));
    }

    #[tokio::test]
    async fn test_no_sources() {
        let sources: Vec<Arc<TestMockSource>> = Vec::new();
        let result = Aggregator::new(sources, Duration::from_secs(1)).run().await;
        assert!(result.table.is_empty());
        assert!(result.failures.is_empty());
    }
}
