//! Funding Monitor: entry point
//!
//! Orchestrates:
//! 1. Config + logging initialization
//! 2. Source adapters and optional WeChat notifier
//! 3. Initial schedule load and first cycle
//! 4. Cycle / refresh tickers until Ctrl+C

use std::path::PathBuf;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use funding_monitor::adapters::create_sources;
use funding_monitor::config::logging::init_logging;
use funding_monitor::config::{load_config, AppConfig};
use funding_monitor::core::{CycleReport, Delivery, Monitor};
use funding_monitor::notify::WechatNotifier;

/// Config location when `CONFIG_PATH` is unset
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // =========================================================================
    // 1. Config + logging
    // =========================================================================
    dotenvy::dotenv().ok();
    init_logging();

    info!("=== Funding Monitor ===");

    let config_path = std::env::var("CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = match load_config(&config_path) {
        Ok(config) => {
            info!(path = %config_path.display(), "Config loaded");
            config
        }
        Err(e) => {
            warn!(path = %config_path.display(), error = %e, "Could not load config, using defaults");
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config
        }
    };

    info!(
        sources = ?config.sources,
        threshold = config.monitor.threshold,
        cooldown_secs = config.monitor.cooldown_secs,
        top_n = config.monitor.top_n,
        cycle_secs = config.monitor.cycle_interval_secs,
        refresh_secs = config.monitor.refresh_interval_secs,
        "Starting with configuration"
    );

    // =========================================================================
    // 2. Sources + notifier
    // =========================================================================
    let sources = create_sources(&config.sources)?;

    let notifier = config.webhook().map(WechatNotifier::new);
    if notifier.is_none() {
        warn!("No webhook configured, running detection-only (no notifications)");
    }

    let monitor = Monitor::new(sources, notifier, config.monitor_settings());

    // =========================================================================
    // 3. Initial schedule load
    // =========================================================================
    let ready = monitor.initialize_sources().await;
    info!(ready = ready, total = monitor.sources().len(), "Sources initialized");

    // =========================================================================
    // 4. Main loop
    // =========================================================================
    let mut cycle_ticker = interval(config.monitor.cycle_interval());
    cycle_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut refresh_ticker = interval(config.monitor.refresh_interval());
    refresh_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Schedules were just loaded by initialization
    refresh_ticker.tick().await;

    info!("Press Ctrl+C to shutdown");

    loop {
        tokio::select! {
            // First tick completes immediately, giving the startup cycle
            _ = cycle_ticker.tick() => {
                let report = monitor.run_cycle_now().await;
                log_report(&report);
            }
            _ = refresh_ticker.tick() => {
                monitor.refresh_schedules().await;
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl+C");
                }
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!(ledger_entries = monitor.gate().ledger().len(), "Clean exit");
    Ok(())
}

fn log_report(report: &CycleReport) {
    let delivery = match &report.delivery {
        Delivery::Disabled => "disabled",
        Delivery::Skipped => "skipped",
        Delivery::Delivered => "delivered",
        Delivery::Failed(_) => "failed",
    };

    info!(
        sources_ok = report.sources_ok,
        sources_failed = report.failures.len(),
        symbols = report.symbols_compared,
        found = report.opportunities.len(),
        eligible = report.eligible,
        notified = report.notified,
        delivery = delivery,
        "Cycle complete"
    );
}
