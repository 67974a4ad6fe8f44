//! Bybit linear perpetual source
//!
//! A single `market/tickers` call carries price, rate, interval and next
//! settlement, so there is no schedule to refresh.

pub mod adapter;
pub mod config;
pub mod types;

pub use adapter::BybitAdapter;
pub use config::BybitConfig;
