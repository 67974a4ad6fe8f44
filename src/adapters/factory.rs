//! Source factory for config-driven exchange selection
//!
//! Creates `FundingSource` instances from config strings.
//! Uses an enum-based dispatch pattern (no `Box<dyn>`) so the aggregator and
//! monitor stay generic over a single concrete source type.

use async_trait::async_trait;

use crate::adapters::binance::{BinanceAdapter, BinanceConfig};
use crate::adapters::bitget::{BitgetAdapter, BitgetConfig};
use crate::adapters::bybit::{BybitAdapter, BybitConfig};
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::gate::{GateAdapter, GateConfig};
use crate::adapters::mexc::{MexcAdapter, MexcConfig};
use crate::adapters::okx::{OkxAdapter, OkxConfig};
use crate::adapters::traits::FundingSource;
use crate::adapters::types::ContractMap;

// =============================================================================
// AnySource: enum-based dispatch over the concrete adapters
// =============================================================================

/// Enum wrapping all concrete source types for runtime dispatch.
pub enum AnySource {
    Binance(BinanceAdapter),
    Okx(OkxAdapter),
    Bybit(BybitAdapter),
    Mexc(MexcAdapter),
    Bitget(BitgetAdapter),
    Gate(GateAdapter),
}

/// Macro to reduce boilerplate for delegating trait methods
macro_rules! delegate {
    ($self:expr, $method:ident ( $($arg:expr),* )) => {
        match $self {
            AnySource::Binance(a) => a.$method($($arg),*),
            AnySource::Okx(a) => a.$method($($arg),*),
            AnySource::Bybit(a) => a.$method($($arg),*),
            AnySource::Mexc(a) => a.$method($($arg),*),
            AnySource::Bitget(a) => a.$method($($arg),*),
            AnySource::Gate(a) => a.$method($($arg),*),
        }
    };
    (await $self:expr, $method:ident ( $($arg:expr),* )) => {
        match $self {
            AnySource::Binance(a) => a.$method($($arg),*).await,
            AnySource::Okx(a) => a.$method($($arg),*).await,
            AnySource::Bybit(a) => a.$method($($arg),*).await,
            AnySource::Mexc(a) => a.$method($($arg),*).await,
            AnySource::Bitget(a) => a.$method($($arg),*).await,
            AnySource::Gate(a) => a.$method($($arg),*).await,
        }
    };
}

#[async_trait]
impl FundingSource for AnySource {
    fn name(&self) -> &'static str {
        delegate!(self, name())
    }

    async fn initialize(&self) -> ExchangeResult<()> {
        delegate!(await self, initialize())
    }

    async fn refresh_schedule(&self) -> ExchangeResult<()> {
        delegate!(await self, refresh_schedule())
    }

    async fn fetch(&self) -> ExchangeResult<ContractMap> {
        delegate!(await self, fetch())
    }
}

// =============================================================================
// Factory Functions
// =============================================================================

/// All supported source names, in their default display order.
pub const SUPPORTED_SOURCES: &[&str] = &["binance", "okx", "bybit", "mexc", "bitget", "gate"];

/// Create a source from a config name string.
///
/// The source is created but NOT initialized, call `initialize()` and
/// `refresh_schedule()` after.
pub fn create_source(name: &str) -> ExchangeResult<AnySource> {
    match name {
        "binance" => Ok(AnySource::Binance(BinanceAdapter::new(BinanceConfig::from_env()))),
        "okx" => Ok(AnySource::Okx(OkxAdapter::new(OkxConfig::from_env()))),
        "bybit" => Ok(AnySource::Bybit(BybitAdapter::new(BybitConfig::from_env()))),
        "mexc" => Ok(AnySource::Mexc(MexcAdapter::new(MexcConfig::from_env()))),
        "bitget" => Ok(AnySource::Bitget(BitgetAdapter::new(BitgetConfig::from_env()))),
        "gate" => Ok(AnySource::Gate(GateAdapter::new(GateConfig::from_env()))),
        _ => Err(ExchangeError::UnknownSource(format!(
            "'{}' (supported: {})",
            name,
            SUPPORTED_SOURCES.join(", ")
        ))),
    }
}

/// Create every named source, failing on the first unknown name.
pub fn create_sources<S: AsRef<str>>(names: &[S]) -> ExchangeResult<Vec<AnySource>> {
    names.iter().map(|n| create_source(n.as_ref())).collect()
}
