//! Core module - Aggregation, settlement alignment, ranking and gating
//!
//! # Module Architecture
//!
//! This module uses **explicit re-exports** instead of glob exports (`pub use module::*`)
//! to provide better API visibility and prevent accidental public API changes.
//!
//! ## Usage
//! Prefer importing from `crate::core`:
//! ```ignore
//! use crate::core::{Monitor, MonitorSettings, Opportunity};
//! ```

pub mod aggregator;
pub mod alignment;
pub mod digest;
pub mod gate;
pub mod monitor;
pub mod ranker;
pub mod types;

// Explicit re-exports for pipeline types
pub use types::{
    current_time_ms, LegProjection, Opportunity, OpportunityKey, SettlementProjection,
    SourceTable, SymbolView,
};
pub use aggregator::{Aggregation, Aggregator, SourceFailure};
pub use alignment::{align, settlement_count};
pub use digest::DigestFormatter;
pub use gate::{CooldownLedger, CooldownPolicy, GateDecision, NotificationGate};
pub use monitor::{CycleReport, Delivery, Monitor, MonitorSettings};
pub use ranker::{rank, DEFAULT_THRESHOLD};
