//! Notification gate with per-opportunity cooldowns.
//!
//! The ledger remembers when each `(symbol, high_source, low_source)` key was
//! last notified. Keys inside their cooldown window are suppressed; the rest
//! are eligible, and only the top-N eligible are selected and stamped.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use tracing::debug;

use crate::core::types::{Opportunity, OpportunityKey};

/// Default cooldown per key (1 hour)
pub const DEFAULT_COOLDOWN_MS: u64 = 3_600_000;
/// Default number of opportunities per digest
pub const DEFAULT_TOP_N: usize = 5;
/// Default ledger retention, in cooldown windows
pub const DEFAULT_RETENTION_WINDOWS: u32 = 10;

/// Cooldown and selection settings for the gate.
#[derive(Debug, Clone)]
pub struct CooldownPolicy {
    /// Minimum time between two notifications of the same key
    pub cooldown_ms: u64,
    /// Maximum opportunities per digest
    pub top_n: usize,
    /// Ledger entries older than this many cooldowns are evicted
    pub retention_windows: u32,
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self {
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            top_n: DEFAULT_TOP_N,
            retention_windows: DEFAULT_RETENTION_WINDOWS,
        }
    }
}

impl CooldownPolicy {
    /// Age beyond which a ledger entry no longer affects eligibility and is dropped
    pub fn retention_ms(&self) -> u64 {
        self.cooldown_ms.saturating_mul(self.retention_windows as u64)
    }
}

// =============================================================================
// Cooldown Ledger
// =============================================================================

/// `key -> last_notified_at_ms`, process memory only.
#[derive(Debug, Default)]
pub struct CooldownLedger {
    entries: RwLock<HashMap<OpportunityKey, u64>>,
}

impl CooldownLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_notified(&self, key: &OpportunityKey) -> Option<u64> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .copied()
    }

    /// True when `key` was never notified or its last notification is at least `cooldown_ms` old.
    pub fn is_eligible(&self, key: &OpportunityKey, now_ms: u64, cooldown_ms: u64) -> bool {
        match self.last_notified(key) {
            Some(at) => now_ms.saturating_sub(at) >= cooldown_ms,
            None => true,
        }
    }

    /// Record a notification of every key at `now_ms`.
    pub fn stamp<'a>(&self, keys: impl IntoIterator<Item = &'a OpportunityKey>, now_ms: u64) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        for key in keys {
            entries.insert(key.clone(), now_ms);
        }
    }

    /// Drop entries older than `max_age_ms`; returns how many were removed.
    pub fn evict_older_than(&self, now_ms: u64, max_age_ms: u64) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, at| now_ms.saturating_sub(*at) < max_age_ms);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Notification Gate
// =============================================================================

/// Outcome of one gate pass.
#[derive(Debug, Clone, Default)]
pub struct GateDecision {
    /// Distinct keys outside their cooldown this cycle
    pub eligible_count: usize,
    /// Top-N eligible opportunities, in rank order; already stamped
    pub selected: Vec<Opportunity>,
}

impl GateDecision {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

/// Cooldown gate in front of the notifier.
pub struct NotificationGate {
    policy: CooldownPolicy,
    ledger: CooldownLedger,
}

impl NotificationGate {
    pub fn new(policy: CooldownPolicy) -> Self {
        Self {
            policy,
            ledger: CooldownLedger::new(),
        }
    }

    pub fn policy(&self) -> &CooldownPolicy {
        &self.policy
    }

    pub fn ledger(&self) -> &CooldownLedger {
        &self.ledger
    }

    /// Filter ranked opportunities through the cooldown ledger.
    ///
    /// Only the first occurrence of a key counts, so a key is never selected
    /// twice in one pass. Exactly the selected opportunities are stamped with
    /// `now_ms`, whatever happens to the digest afterwards.
    pub fn admit(&self, ranked: &[Opportunity], now_ms: u64) -> GateDecision {
        let mut seen: HashSet<OpportunityKey> = HashSet::with_capacity(ranked.len());
        let mut eligible: Vec<&Opportunity> = Vec::new();

        for opp in ranked {
            let key = opp.key();
            if !seen.insert(key.clone()) {
                continue;
            }
            if self.ledger.is_eligible(&key, now_ms, self.policy.cooldown_ms) {
                eligible.push(opp);
            }
        }

        let selected: Vec<Opportunity> = eligible
            .iter()
            .take(self.policy.top_n)
            .map(|o| (*o).clone())
            .collect();

        let keys: Vec<OpportunityKey> = selected.iter().map(|o| o.key()).collect();
        self.ledger.stamp(&keys, now_ms);

        let evicted = self.ledger.evict_older_than(now_ms, self.policy.retention_ms());
        if evicted > 0 {
            debug!(evicted = evicted, remaining = self.ledger.len(), "Cooldown ledger pruned");
        }

        GateDecision {
            eligible_count: eligible.len(),
            selected,
        }
    }
}
