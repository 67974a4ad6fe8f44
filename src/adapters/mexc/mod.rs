//! MEXC contract source
//!
//! Funding rates from `contract/funding_rate`, prices and 24h turnover from
//! `contract/ticker`. Thinly traded contracts are filtered out.

pub mod adapter;
pub mod config;
pub mod types;

pub use adapter::MexcAdapter;
pub use config::MexcConfig;
