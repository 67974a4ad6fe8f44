//! Configuration module
//!
//! This module provides:
//! - Configuration types (`AppConfig`, `MonitorConfig`, `NotifierConfig`)
//! - YAML loading functionality (`load_config`)
//! - Logging setup (`logging::init_logging`)

mod loader;
pub mod logging;
mod types;

pub use types::{AppConfig, MonitorConfig, NotifierConfig, WEBHOOK_ENV};

pub use loader::{load_config, load_config_from_str};
