//! Exchange sources for Binance, OKX, Bybit, MEXC, Bitget and Gate
//!
//! This module provides the `FundingSource` abstraction and one REST adapter
//! per exchange, each normalizing its payloads into `ContractFact`s keyed by
//! canonical `BASEUSDT` symbols.

pub mod binance;
pub mod bitget;
pub mod bybit;
pub mod errors;
pub mod factory;
pub mod gate;
pub mod mexc;
pub mod okx;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types for convenience
pub use binance::{BinanceAdapter, BinanceConfig};
pub use bitget::{BitgetAdapter, BitgetConfig};
pub use bybit::{BybitAdapter, BybitConfig};
pub use errors::{ExchangeError, ExchangeResult};
pub use factory::{create_source, create_sources, AnySource, SUPPORTED_SOURCES};
pub use gate::{GateAdapter, GateConfig};
pub use mexc::{MexcAdapter, MexcConfig};
pub use okx::{OkxAdapter, OkxConfig};
pub use traits::FundingSource;
pub use types::{ContractFact, ContractMap, ScheduleCache, ScheduleEntry};
