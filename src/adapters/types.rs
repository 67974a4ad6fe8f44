//! Core data types for exchange sources
//!
//! These types are used across all exchange adapters for a consistent
//! contract representation, plus the shared HTTP plumbing they rely on.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::adapters::errors::{ExchangeError, ExchangeResult};

// =============================================================================
// Constants
// =============================================================================

/// Funding interval assumed when an exchange does not report one
pub const DEFAULT_FUNDING_INTERVAL_HOURS: f64 = 8.0;

/// Milliseconds per hour
pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Quote asset every source is restricted to
pub const QUOTE_ASSET: &str = "USDT";

// =============================================================================
// Contract Fact
// =============================================================================

/// One exchange's observation of one perpetual contract at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractFact {
    /// Canonical symbol (e.g. "BTCUSDT"), identical across exchanges
    pub symbol: String,
    /// Last traded price, mark price as fallback
    pub price: f64,
    /// Most recent per-settlement funding rate (0.0001 = 0.01%)
    pub funding_rate: f64,
    /// Hours between two settlements
    pub funding_interval_hours: f64,
    /// Next settlement (epoch ms), 0 when unknown
    pub next_settlement_ms: u64,
}

impl ContractFact {
    /// Build a fact, replacing a missing or non-positive interval with the 8h default.
    pub fn new(
        symbol: impl Into<String>,
        price: f64,
        funding_rate: f64,
        funding_interval_hours: f64,
        next_settlement_ms: u64,
    ) -> Self {
        let funding_interval_hours =
            if funding_interval_hours.is_finite() && funding_interval_hours > 0.0 {
                funding_interval_hours
            } else {
                DEFAULT_FUNDING_INTERVAL_HOURS
            };

        Self {
            symbol: symbol.into(),
            price,
            funding_rate,
            funding_interval_hours,
            next_settlement_ms,
        }
    }

    /// Usable for settlement alignment: positive price, finite rate, known settlement.
    pub fn is_valid(&self) -> bool {
        self.price.is_finite()
            && self.price > 0.0
            && self.funding_rate.is_finite()
            && self.next_settlement_ms > 0
    }

    /// Valid and settling strictly after `now_ms`.
    #[inline]
    pub fn settles_after(&self, now_ms: u64) -> bool {
        self.is_valid() && self.next_settlement_ms > now_ms
    }

    /// Settlement interval in milliseconds
    #[inline]
    pub fn interval_ms(&self) -> f64 {
        self.funding_interval_hours * MS_PER_HOUR
    }

    /// Funding rate normalized to a 4-hour interval
    pub fn funding_rate_4h(&self) -> f64 {
        self.funding_rate * (4.0 / self.funding_interval_hours)
    }
}

/// All contracts reported by one source, keyed by canonical symbol
pub type ContractMap = HashMap<String, ContractFact>;

// =============================================================================
// Schedule Cache
// =============================================================================

/// Cached settlement schedule for one symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleEntry {
    /// Hours between settlements
    pub interval_hours: f64,
    /// Last known settlement instant (epoch ms), 0 when unknown
    pub next_settlement_ms: u64,
}

impl ScheduleEntry {
    pub fn interval(interval_hours: f64) -> Self {
        Self {
            interval_hours,
            next_settlement_ms: 0,
        }
    }
}

/// Per-adapter schedule table shared between refresh (writer) and fetch (readers).
///
/// Owned by one adapter instance; clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct ScheduleCache {
    entries: Arc<RwLock<HashMap<String, ScheduleEntry>>>,
}

impl ScheduleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Funding interval for `symbol`, 8h when not cached.
    pub async fn interval_hours(&self, symbol: &str) -> f64 {
        self.entries
            .read()
            .await
            .get(symbol)
            .map(|e| e.interval_hours)
            .unwrap_or(DEFAULT_FUNDING_INTERVAL_HOURS)
    }

    /// Cached entry for `symbol`
    pub async fn get(&self, symbol: &str) -> Option<ScheduleEntry> {
        self.entries.read().await.get(symbol).copied()
    }

    /// Record a freshly observed interval, keeping any known settlement time.
    pub async fn set_interval(&self, symbol: &str, interval_hours: f64) {
        if !(interval_hours.is_finite() && interval_hours > 0.0) {
            return;
        }
        let mut entries = self.entries.write().await;
        entries
            .entry(symbol.to_string())
            .and_modify(|e| e.interval_hours = interval_hours)
            .or_insert_with(|| ScheduleEntry::interval(interval_hours));
    }

    /// Merge a batch of refreshed entries under a single write lock.
    pub async fn merge(&self, batch: impl IntoIterator<Item = (String, ScheduleEntry)>) -> usize {
        let mut entries = self.entries.write().await;
        let mut count = 0;
        for (symbol, entry) in batch {
            if entry.interval_hours.is_finite() && entry.interval_hours > 0.0 {
                entries.insert(symbol, entry);
                count += 1;
            }
        }
        count
    }

    /// Snapshot of the whole table under one read lock.
    pub async fn snapshot(&self) -> HashMap<String, ScheduleEntry> {
        self.entries.read().await.clone()
    }

    /// Number of cached symbols
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Roll a cached settlement instant forward by whole intervals until it lies after `now_ms`.
///
/// Returns 0 when the anchor is unknown or the interval is unusable.
pub fn roll_forward(anchor_ms: u64, interval_hours: f64, now_ms: u64) -> u64 {
    if anchor_ms == 0 || !(interval_hours.is_finite() && interval_hours > 0.0) {
        return 0;
    }
    if anchor_ms > now_ms {
        return anchor_ms;
    }
    let interval_ms = (interval_hours * MS_PER_HOUR) as u64;
    if interval_ms == 0 {
        return 0;
    }
    let elapsed = now_ms - anchor_ms;
    anchor_ms + (elapsed / interval_ms + 1) * interval_ms
}

// =============================================================================
// Parsing Helpers
// =============================================================================

/// Parse a numeric string field; empty, malformed or non-finite values yield None.
pub fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a millisecond timestamp carried as a string.
pub fn parse_ms(raw: &str) -> u64 {
    raw.trim().parse::<u64>().unwrap_or(0)
}

/// Last price when positive, otherwise the mark price when positive.
pub fn pick_price(last: Option<f64>, mark: Option<f64>) -> Option<f64> {
    last.filter(|p| *p > 0.0).or(mark.filter(|p| *p > 0.0))
}

/// Normalize an exchange instrument id to `BASEUSDT`.
///
/// `suffix` is the exchange-specific quote suffix, e.g. `"-USDT-SWAP"` for OKX,
/// `"_USDT"` for Gate/MEXC, `"USDT"` for exchanges already in canonical form.
pub fn normalize_symbol(raw: &str, suffix: &str) -> Option<String> {
    let base = raw.strip_suffix(suffix)?;
    if base.is_empty() {
        return None;
    }
    Some(format!("{}{}", base, QUOTE_ASSET))
}

// =============================================================================
// Shared HTTP Client
// =============================================================================

/// HTTP request timeout (seconds)
const HTTP_TIMEOUT_SECS: u64 = 10;
/// HTTP connection timeout (milliseconds)
const HTTP_CONNECT_TIMEOUT_MS: u64 = 3000;
/// Max idle connections per host in connection pool
const HTTP_POOL_MAX_IDLE: usize = 2;
/// How long idle connections stay in the pool (seconds)
const HTTP_POOL_IDLE_TIMEOUT_SECS: u64 = 90;
/// TCP keepalive interval (seconds)
const HTTP_TCP_KEEPALIVE_SECS: u64 = 30;

/// Create the REST client used by one exchange source
pub fn create_http_client(exchange_name: &str) -> reqwest::Client {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE)
        .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECS))
        .tcp_keepalive(Duration::from_secs(HTTP_TCP_KEEPALIVE_SECS))
        .connect_timeout(Duration::from_millis(HTTP_CONNECT_TIMEOUT_MS))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
    tracing::debug!(
        phase = "init",
        exchange = %exchange_name,
        timeout_s = HTTP_TIMEOUT_SECS,
        connect_timeout_ms = HTTP_CONNECT_TIMEOUT_MS,
        "HTTP client configured"
    );
    client
}

/// GET `base_url + path` and decode the JSON body.
///
/// Non-2xx statuses map to `HttpStatus`, undecodable bodies to `InvalidResponse`.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    base_url: &str,
    path: &str,
) -> ExchangeResult<T> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), path);
    let response = client.get(&url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExchangeError::HttpStatus {
            endpoint: path.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| ExchangeError::InvalidResponse(format!("{}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_fact_defaults_interval() {
        let fact = ContractFact::new("BTCUSDT", 100.0, 0.0001, 0.0, 1);
        assert_eq!(fact.funding_interval_hours, 8.0);

        let fact = ContractFact::new("BTCUSDT", 100.0, 0.0001, f64::NAN, 1);
        assert_eq!(fact.funding_interval_hours, 8.0);

        let fact = ContractFact::new("BTCUSDT", 100.0, 0.0001, 4.0, 1);
        assert_eq!(fact.funding_interval_hours, 4.0);
    }

    #[test]
    fn test_contract_fact_validity() {
        assert!(ContractFact::new("BTCUSDT", 100.0, 0.0001, 8.0, 1).is_valid());
        assert!(!ContractFact::new("BTCUSDT", 0.0, 0.0001, 8.0, 1).is_valid());
        assert!(!ContractFact::new("BTCUSDT", -1.0, 0.0001, 8.0, 1).is_valid());
        assert!(!ContractFact::new("BTCUSDT", 100.0, f64::NAN, 8.0, 1).is_valid());
        assert!(!ContractFact::new("BTCUSDT", 100.0, 0.0001, 8.0, 0).is_valid());
    }

    #[test]
    fn test_settles_after() {
        let fact = ContractFact::new("BTCUSDT", 100.0, 0.0001, 8.0, 1_000);
        assert!(fact.settles_after(999));
        assert!(!fact.settles_after(1_000));
    }

    #[test]
    fn test_funding_rate_4h() {
        let fact = ContractFact::new("BTCUSDT", 100.0, 0.0008, 8.0, 1);
        assert!((fact.funding_rate_4h() - 0.0004).abs() < 1e-12);
        let fact = ContractFact::new("BTCUSDT", 100.0, 0.0001, 1.0, 1);
        assert!((fact.funding_rate_4h() - 0.0004).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("BTC-USDT-SWAP", "-USDT-SWAP").as_deref(), Some("BTCUSDT"));
        assert_eq!(normalize_symbol("ETH_USDT", "_USDT").as_deref(), Some("ETHUSDT"));
        assert_eq!(normalize_symbol("SOLUSDT", "USDT").as_deref(), Some("SOLUSDT"));
        assert_eq!(normalize_symbol("BTC-USD-SWAP", "-USDT-SWAP"), None);
        assert_eq!(normalize_symbol("_USDT", "_USDT"), None);
        assert_eq!(normalize_symbol("BTCUSDC", "USDT"), None);
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_f64("0.0001"), Some(0.0001));
        assert_eq!(parse_f64(" 42 "), Some(42.0));
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("abc"), None);
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_ms("1700000000000"), 1_700_000_000_000);
        assert_eq!(parse_ms(""), 0);
    }

    #[test]
    fn test_pick_price() {
        assert_eq!(pick_price(Some(10.0), Some(11.0)), Some(10.0));
        assert_eq!(pick_price(Some(0.0), Some(11.0)), Some(11.0));
        assert_eq!(pick_price(None, Some(11.0)), Some(11.0));
        assert_eq!(pick_price(None, Some(-1.0)), None);
        assert_eq!(pick_price(None, None), None);
    }

    #[test]
    fn test_roll_forward() {
        let hour = 3_600_000u64;
        // Future anchor is kept as-is
        assert_eq!(roll_forward(10 * hour, 8.0, 5 * hour), 10 * hour);
        // Past anchor advances by whole intervals
        assert_eq!(roll_forward(10 * hour, 8.0, 11 * hour), 18 * hour);
        assert_eq!(roll_forward(10 * hour, 8.0, 18 * hour), 26 * hour);
        // Unknown anchor or bad interval
        assert_eq!(roll_forward(0, 8.0, hour), 0);
        assert_eq!(roll_forward(hour, 0.0, 2 * hour), 0);
    }

    #[tokio::test]
    async fn test_schedule_cache_defaults_and_updates() {
        let cache = ScheduleCache::new();
        assert_eq!(cache.interval_hours("BTCUSDT").await, 8.0);

        cache.set_interval("BTCUSDT", 4.0).await;
        assert_eq!(cache.interval_hours("BTCUSDT").await, 4.0);

        // Non-positive intervals are ignored
        cache.set_interval("BTCUSDT", 0.0).await;
        assert_eq!(cache.interval_hours("BTCUSDT").await, 4.0);

        let merged = cache
            .merge(vec![
                ("ETHUSDT".to_string(), ScheduleEntry { interval_hours: 1.0, next_settlement_ms: 42 }),
                ("BAD".to_string(), ScheduleEntry::interval(-1.0)),
            ])
            .await;
        assert_eq!(merged, 1);
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("ETHUSDT").await.map(|e| e.next_settlement_ms), Some(42));
    }

    #[tokio::test]
    async fn test_schedule_cache_clones_share_table() {
        let cache = ScheduleCache::new();
        let reader = cache.clone();
        cache.set_interval("BTCUSDT", 1.0).await;
        assert_eq!(reader.interval_hours("BTCUSDT").await, 1.0);
    }
}
