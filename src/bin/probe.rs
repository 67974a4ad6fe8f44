//! Source probe
//!
//! Runs initialize → refresh → fetch against each source once and prints a
//! sample of the normalized contracts. Useful to check connectivity and
//! symbol/interval normalization without running the monitor.
//!
//! With `--wechat` it also posts one check message to the configured webhook
//! (`WECHAT_WEBHOOK` or `notifier.wechat_webhook`).
//!
//! ```bash
//! cargo run --bin probe                  # all supported sources
//! cargo run --bin probe -- okx gate      # selected sources
//! cargo run --bin probe -- --wechat      # webhook check only
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use funding_monitor::adapters::{create_source, FundingSource, SUPPORTED_SOURCES};
use funding_monitor::config::logging::init_logging;
use funding_monitor::config::{load_config, AppConfig};
use funding_monitor::notify::WechatNotifier;

const WECHAT_FLAG: &str = "--wechat";

/// Contracts printed per source
const SAMPLE_SIZE: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let check_webhook = args.iter().any(|a| a == WECHAT_FLAG);
    args.retain(|a| a != WECHAT_FLAG);

    if check_webhook {
        send_webhook_check().await?;
    }

    let names: Vec<String> = if !args.is_empty() {
        args
    } else if check_webhook {
        Vec::new()
    } else {
        SUPPORTED_SOURCES.iter().map(|s| s.to_string()).collect()
    };

    for name in &names {
        let source = match create_source(name) {
            Ok(source) => source,
            Err(e) => {
                error!(exchange = %name, error = %e, "Unknown source");
                continue;
            }
        };

        let started = Instant::now();
        if let Err(e) = source.initialize().await {
            error!(exchange = %name, error = %e, "Initialize failed");
            continue;
        }
        if let Err(e) = source.refresh_schedule().await {
            error!(exchange = %name, error = %e, "Schedule refresh failed");
        }

        let contracts = match source.fetch().await {
            Ok(contracts) => contracts,
            Err(e) => {
                error!(exchange = %name, error = %e, "Fetch failed");
                continue;
            }
        };

        info!(
            exchange = %name,
            contracts = contracts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Probe succeeded"
        );

        let mut facts: Vec<_> = contracts.values().collect();
        facts.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        println!("\n== {} ({} contracts) ==", name, contracts.len());
        println!(
            "{:<14} {:>14} {:>11} {:>6} {:>18} {:>11}",
            "symbol", "price", "rate %", "hours", "next (UTC)", "4h rate %"
        );
        for fact in facts.into_iter().take(SAMPLE_SIZE) {
            let next = DateTime::<Utc>::from_timestamp_millis(fact.next_settlement_ms as i64)
                .filter(|_| fact.next_settlement_ms > 0)
                .map(|t| t.format("%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            println!(
                "{:<14} {:>14.4} {:>11.5} {:>6} {:>18} {:>11.5}",
                fact.symbol,
                fact.price,
                fact.funding_rate * 100.0,
                fact.funding_interval_hours,
                next,
                fact.funding_rate_4h() * 100.0
            );
        }
    }

    Ok(())
}

/// Post one check message to the configured webhook.
async fn send_webhook_check() -> anyhow::Result<()> {
    let config_path = std::env::var("CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.yaml"));
    let config = load_config(&config_path).unwrap_or_else(|e| {
        warn!(path = %config_path.display(), error = %e, "Could not load config, using defaults");
        let mut config = AppConfig::default();
        config.apply_env_overrides();
        config
    });

    let url = config
        .webhook()
        .context("No webhook configured, set WECHAT_WEBHOOK")?;

    WechatNotifier::new(url)
        .send_check_message()
        .await
        .context("Webhook check failed")?;
    info!("Webhook check message sent");
    Ok(())
}
