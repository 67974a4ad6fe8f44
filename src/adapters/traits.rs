//! Exchange source trait definition
//!
//! The FundingSource trait defines the common interface that every
//! exchange integration implements so the aggregation pipeline never
//! branches on exchange identity.

use async_trait::async_trait;

use crate::adapters::errors::ExchangeResult;
use crate::adapters::types::ContractMap;

/// Common trait for all funding-rate sources
///
/// # Example Implementation
///
/// ```ignore
/// use async_trait::async_trait;
///
/// struct StaticSource {
///     contracts: ContractMap,
/// }
///
/// #[async_trait]
/// impl FundingSource for StaticSource {
///     fn name(&self) -> &'static str {
///         "static"
///     }
///     async fn fetch(&self) -> ExchangeResult<ContractMap> {
///         Ok(self.contracts.clone())
///     }
///     // ... other methods
/// }
/// ```
#[async_trait]
pub trait FundingSource: Send + Sync {
    /// Exchange identifier used in logs, opportunities and dedup keys
    fn name(&self) -> &'static str;

    /// One-time setup before the first refresh/fetch
    async fn initialize(&self) -> ExchangeResult<()>;

    /// Refresh per-symbol settlement metadata (interval, next settlement).
    ///
    /// Takes the schedule cache write lock; safe to run concurrently with `fetch`.
    async fn refresh_schedule(&self) -> ExchangeResult<()>;

    /// Fetch the current contract snapshot keyed by canonical symbol.
    ///
    /// Records with missing or malformed fields are skipped; only a failure of
    /// the whole request is reported as an error.
    async fn fetch(&self) -> ExchangeResult<ContractMap>;
}
