//! Monitor: one aggregation → alignment → ranking → gating → delivery cycle.
//!
//! The driver owns a `Monitor` and calls `run_cycle_now` on every tick and
//! `refresh_schedules` on the slower refresh tick. Cycles never overlap
//! because both are awaited from the same select loop.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{error, info, warn};

use crate::adapters::traits::FundingSource;
use crate::core::aggregator::{Aggregation, Aggregator, SourceFailure, DEFAULT_FETCH_TIMEOUT_MS};
use crate::core::alignment::MIN_SOURCES;
use crate::core::digest::{DigestFormatter, DEFAULT_UTC_OFFSET_HOURS};
use crate::core::gate::{CooldownPolicy, NotificationGate};
use crate::core::ranker::{rank_views, DEFAULT_THRESHOLD};
use crate::core::types::{current_time_ms, Opportunity};
use crate::notify::Notifier;

/// Detection and notification settings for a monitor.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Minimum net profit (fraction) for an opportunity to be reported
    pub threshold: f64,
    pub cooldown: CooldownPolicy,
    /// Per-source fetch deadline
    pub fetch_timeout: Duration,
    /// Display offset for digest timestamps
    pub utc_offset_hours: i32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            cooldown: CooldownPolicy::default(),
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

/// What happened to the digest this cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// No notifier configured, detection only
    Disabled,
    /// Nothing passed the gate
    Skipped,
    Delivered,
    /// Transport failed; the selected keys stay stamped
    Failed(String),
}

/// Summary of one cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Instant the fetched facts were evaluated against
    pub evaluated_at_ms: u64,
    pub sources_ok: usize,
    pub failures: Vec<SourceFailure>,
    /// Symbols present on at least two qualifying sources
    pub symbols_compared: usize,
    /// Opportunities above the threshold, best first
    pub opportunities: Vec<Opportunity>,
    /// Opportunities outside their cooldown
    pub eligible: usize,
    /// Opportunities included in the digest
    pub notified: usize,
    pub delivery: Delivery,
}

/// Funding-rate arbitrage monitor over sources `S` and notifier `N`.
pub struct Monitor<S, N> {
    aggregator: Aggregator<S>,
    gate: NotificationGate,
    notifier: Option<N>,
    digest: DigestFormatter,
    threshold: f64,
}

impl<S, N> Monitor<S, N>
where
    S: FundingSource + 'static,
    N: Notifier,
{
    /// Without a notifier the monitor runs detection-only: nothing is gated or stamped.
    pub fn new(sources: Vec<S>, notifier: Option<N>, settings: MonitorSettings) -> Self {
        let sources = sources.into_iter().map(Arc::new).collect();
        Self {
            aggregator: Aggregator::new(sources, settings.fetch_timeout),
            gate: NotificationGate::new(settings.cooldown),
            notifier,
            digest: DigestFormatter::new(settings.utc_offset_hours, settings.threshold),
            threshold: settings.threshold,
        }
    }

    pub fn gate(&self) -> &NotificationGate {
        &self.gate
    }

    pub fn sources(&self) -> &[Arc<S>] {
        self.aggregator.sources()
    }

    pub fn is_detection_only(&self) -> bool {
        self.notifier.is_none()
    }

    /// Initialize every source and load its first schedule, concurrently.
    ///
    /// Failures are logged and never fatal; returns the number of sources ready.
    pub async fn initialize_sources(&self) -> usize {
        let results = join_all(self.sources().iter().map(|source| async move {
            let name = source.name();
            let result = match source.initialize().await {
                Ok(()) => source.refresh_schedule().await,
                Err(e) => Err(e),
            };
            (name, result)
        }))
        .await;

        let mut ready = 0;
        for (name, result) in results {
            match result {
                Ok(()) => {
                    ready += 1;
                    info!(phase = "init", exchange = name, "Source initialized");
                }
                Err(e) => warn!(phase = "init", exchange = name, error = %e, "Source initialization failed"),
            }
        }
        ready
    }

    /// Refresh every source's settlement schedule, concurrently.
    pub async fn refresh_schedules(&self) -> usize {
        let results = join_all(
            self.sources()
                .iter()
                .map(|source| async move { (source.name(), source.refresh_schedule().await) }),
        )
        .await;

        let mut refreshed = 0;
        for (name, result) in results {
            match result {
                Ok(()) => refreshed += 1,
                Err(e) => warn!(exchange = name, error = %e, "Schedule refresh failed"),
            }
        }
        info!(refreshed = refreshed, total = self.sources().len(), "Schedules refreshed");
        refreshed
    }

    /// Run one cycle at the current wall-clock time.
    ///
    /// The clock is read after the fan-in, so an instant that passes while a
    /// slow source is answering counts as expired.
    pub async fn run_cycle_now(&self) -> CycleReport {
        let aggregation = self.aggregator.run().await;
        self.evaluate(aggregation, current_time_ms()).await
    }

    /// Run one full cycle with `now_ms` as the reference instant.
    pub async fn run_cycle(&self, now_ms: u64) -> CycleReport {
        let aggregation = self.aggregator.run().await;
        self.evaluate(aggregation, now_ms).await
    }

    /// Align, rank, gate and deliver one cycle's facts at `now_ms`.
    async fn evaluate(&self, aggregation: Aggregation, now_ms: u64) -> CycleReport {
        let views = aggregation.table.symbol_views();
        let symbols_compared = views
            .iter()
            .filter(|v| v.qualifying(now_ms).count() >= MIN_SOURCES)
            .count();
        let opportunities = rank_views(&views, now_ms, self.threshold);

        let mut report = CycleReport {
            evaluated_at_ms: now_ms,
            sources_ok: aggregation.table.len(),
            failures: aggregation.failures,
            symbols_compared,
            opportunities,
            eligible: 0,
            notified: 0,
            delivery: Delivery::Skipped,
        };

        let Some(notifier) = &self.notifier else {
            report.delivery = Delivery::Disabled;
            self.log_detected(&report);
            return report;
        };

        let decision = self.gate.admit(&report.opportunities, now_ms);
        report.eligible = decision.eligible_count;
        report.notified = decision.selected.len();

        if decision.is_empty() {
            if !report.opportunities.is_empty() {
                info!(
                    found = report.opportunities.len(),
                    "All opportunities within cooldown, digest skipped"
                );
            }
            return report;
        }

        let text = self.digest.render(decision.eligible_count, &decision.selected);
        report.delivery = match notifier.deliver(&text).await {
            Ok(()) => {
                info!(
                    notifier = notifier.name(),
                    notified = report.notified,
                    eligible = report.eligible,
                    "Digest delivered"
                );
                Delivery::Delivered
            }
            Err(e) => {
                error!(notifier = notifier.name(), error = %e, "Digest delivery failed");
                Delivery::Failed(e.to_string())
            }
        };

        report
    }

    fn log_detected(&self, report: &CycleReport) {
        let top_n = self.gate.policy().top_n;
        for opp in report.opportunities.iter().take(top_n) {
            info!(
                symbol = %opp.symbol,
                high = %opp.high_source,
                low = %opp.low_source,
                net_profit = opp.net_profit,
                target = %self.digest.format_time(opp.target_time_ms),
                "Opportunity detected"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_utils::TestMockSource;
    use crate::adapters::types::ContractFact;
    use crate::notify::{NotifyError, NotifyResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    const HOUR: u64 = 3_600_000;
    const NOW: u64 = 1_700_000_000_000;

    #[derive(Default)]
    struct Capture {
        messages: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for Arc<Capture> {
        fn name(&self) -> &'static str {
            "capture"
        }

        async fn deliver(&self, text: &str) -> NotifyResult<()> {
            self.messages.lock().unwrap().push(text.to_string());
            if self.fail {
                return Err(NotifyError::Rejected(500));
            }
            Ok(())
        }
    }

    fn sources() -> Vec<TestMockSource> {
        vec![
            TestMockSource::new("a")
                .with_contract(ContractFact::new("BTCUSDT", 100.0, 0.001, 8.0, NOW + 2 * HOUR)),
            TestMockSource::new("b")
                .with_contract(ContractFact::new("BTCUSDT", 99.0, -0.0005, 8.0, NOW + 2 * HOUR)),
            TestMockSource::failing("c"),
        ]
    }

    #[tokio::test]
    async fn test_cycle_notifies_then_cools_down() {
        let capture = Arc::new(Capture::default());
        let monitor = Monitor::new(sources(), Some(capture.clone()), MonitorSettings::default());

        let first = monitor.run_cycle(NOW).await;
        assert_eq!(first.sources_ok, 2);
        assert_eq!(first.failures.len(), 1);
        assert_eq!(first.symbols_compared, 1);
        assert_eq!(first.opportunities.len(), 1);
        assert_eq!(first.notified, 1);
        assert_eq!(first.delivery, Delivery::Delivered);

        let second = monitor.run_cycle(NOW + 60_000).await;
        assert_eq!(second.opportunities.len(), 1);
        assert_eq!(second.notified, 0);
        assert_eq!(second.delivery, Delivery::Skipped);
        assert_eq!(capture.messages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_stamp() {
        let capture = Arc::new(Capture {
            fail: true,
            ..Default::default()
        });
        let monitor = Monitor::new(sources(), Some(capture.clone()), MonitorSettings::default());

        let report = monitor.run_cycle(NOW).await;
        assert!(matches!(report.delivery, Delivery::Failed(ref msg) if msg.contains("500")));
        assert_eq!(monitor.gate().ledger().len(), 1);

        let retry = monitor.run_cycle(NOW + 1).await;
        assert_eq!(retry.notified, 0);
    }

    #[tokio::test]
    async fn test_detection_only_leaves_ledger_untouched() {
        let monitor: Monitor<TestMockSource, Arc<Capture>> =
            Monitor::new(sources(), None, MonitorSettings::default());
        assert!(monitor.is_detection_only());

        let report = monitor.run_cycle(NOW).await;
        assert_eq!(report.opportunities.len(), 1);
        assert_eq!(report.delivery, Delivery::Disabled);
        assert!(monitor.gate().ledger().is_empty());
    }

    #[tokio::test]
    async fn test_settlement_passed_during_fetch_is_expired() {
        let target = current_time_ms() + 150;
        let sources = vec![
            TestMockSource::new("a")
                .with_contract(ContractFact::new("BTCUSDT", 100.0, 0.001, 8.0, target))
                .with_delay(Duration::from_millis(400)),
            TestMockSource::new("b")
                .with_contract(ContractFact::new("BTCUSDT", 99.0, -0.0005, 8.0, target)),
        ];
        let capture = Arc::new(Capture::default());
        let monitor = Monitor::new(sources, Some(capture.clone()), MonitorSettings::default());

        let report = monitor.run_cycle_now().await;

        assert_eq!(report.sources_ok, 2);
        assert!(report.evaluated_at_ms > target);
        assert_eq!(report.symbols_compared, 0);
        assert!(report.opportunities.is_empty());
        assert_eq!(report.delivery, Delivery::Skipped);
        assert!(capture.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_and_refresh_reach_every_source() {
        let monitor: Monitor<TestMockSource, Arc<Capture>> =
            Monitor::new(sources(), None, MonitorSettings::default());

        assert_eq!(monitor.initialize_sources().await, 3);
        assert_eq!(monitor.refresh_schedules().await, 3);
        assert!(monitor.sources().iter().all(|s| s.refresh_count() == 2));
    }
}
