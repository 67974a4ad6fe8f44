//! Funding Monitor: cross-exchange funding-rate arbitrage detection
//!
//! Periodically samples perpetual funding rates and prices from several
//! exchanges and reports settlement-aligned arbitrage opportunities:
//! - Exchange sources (Binance, OKX, Bybit, MEXC, Bitget, Gate) via REST
//! - Aggregation, settlement alignment and ranking pipeline
//! - Cooldown-gated digest notifications (WeChat Work webhook)

pub mod adapters;
pub mod config;
pub mod core;
pub mod error;
pub mod notify;

pub use error::AppError;
