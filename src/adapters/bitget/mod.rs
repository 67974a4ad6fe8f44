//! Bitget USDT-M futures source

pub mod adapter;
pub mod config;
pub mod types;

pub use adapter::BitgetAdapter;
pub use config::BitgetConfig;
