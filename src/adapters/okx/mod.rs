//! OKX perpetual swap source
//!
//! Funding rates from `public/funding-rate`, prices from `market/tickers`.
//! Settlement intervals are derived from the gap between the current and
//! next funding times.

pub mod adapter;
pub mod config;
pub mod types;

pub use adapter::OkxAdapter;
pub use config::OkxConfig;
