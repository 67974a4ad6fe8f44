//! Binance USDⓈ-M futures source
//!
//! Funding rates and mark prices from `premiumIndex`, settlement intervals
//! from `fundingInfo` (refreshed on the schedule cycle).

pub mod adapter;
pub mod config;
pub mod types;

pub use adapter::BinanceAdapter;
pub use config::BinanceConfig;
