//! Shared test utilities for source testing
//!
//! Provides a configurable `TestMockSource` used by the trait, aggregator
//! and monitor test modules.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::traits::FundingSource;
use crate::adapters::types::{ContractFact, ContractMap};

/// Unified mock source for testing
pub struct TestMockSource {
    /// Exchange name returned by `name()`
    pub name: &'static str,
    /// Contracts returned by `fetch()`
    pub contracts: ContractMap,
    /// When true, `fetch` returns an error
    pub should_fail: bool,
    /// When true, `fetch` panics
    pub should_panic: bool,
    /// Artificial latency applied to `fetch`
    pub delay: Option<Duration>,
    /// Number of `fetch` calls (shared for async assertions)
    pub fetch_count: Arc<AtomicUsize>,
    /// Number of `refresh_schedule` calls
    pub refresh_count: Arc<AtomicUsize>,
}

impl TestMockSource {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            contracts: ContractMap::new(),
            should_fail: false,
            should_panic: false,
            delay: None,
            fetch_count: Arc::new(AtomicUsize::new(0)),
            refresh_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock whose `fetch` always fails
    pub fn failing(name: &'static str) -> Self {
        let mut mock = Self::new(name);
        mock.should_fail = true;
        mock
    }

    /// Create a mock whose `fetch` panics
    pub fn panicking(name: &'static str) -> Self {
        let mut mock = Self::new(name);
        mock.should_panic = true;
        mock
    }

    pub fn with_contract(mut self, fact: ContractFact) -> Self {
        self.contracts.insert(fact.symbol.clone(), fact);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FundingSource for TestMockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self) -> ExchangeResult<()> {
        Ok(())
    }

    async fn refresh_schedule(&self) -> ExchangeResult<()> {
        self.refresh_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch(&self) -> ExchangeResult<ContractMap> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.should_panic {
            panic!("Mock panic in {}", self.name);
        }

        if self.should_fail {
            return Err(ExchangeError::RequestFailed("Mock failure".to_string()));
        }

        Ok(self.contracts.clone())
    }
}
