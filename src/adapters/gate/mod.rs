//! Gate.io USDT futures source
//!
//! Tickers carry no settlement time, so `refresh_schedule` caches each
//! contract's interval and next apply time, and `fetch` rolls that anchor
//! forward past the current instant.

pub mod adapter;
pub mod config;
pub mod types;

pub use adapter::GateAdapter;
pub use config::GateConfig;
