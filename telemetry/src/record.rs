//! Telemetry record shapes (spec §4.9).

use aide_classify::Tier;
use aide_core::{AideId, ErrorKind, SessionId, TurnId, UserId};
use aide_llm::TokenUsage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One per-pass usage sample, kept alongside the turn's summed usage so
/// a cost breakdown by tier is reconstructable after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassUsage {
    /// Tier this pass ran at (`tier_trace` entry).
    pub tier: String,
    /// Token usage for this pass alone.
    pub usage: TokenUsage,
}

/// The record appended exactly once per completed turn (spec §4.9).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnTelemetry {
    /// The turn this record describes.
    pub turn_id: TurnId,
    /// The aide (living page) the turn belongs to.
    pub aide_id: AideId,
    /// The user who sent the triggering message.
    pub user_id: UserId,
    /// The session the turn ran on, if known.
    #[serde(default)]
    pub session_id: Option<SessionId>,
    /// Tiers actually run, in order (e.g. `["fast", "structural", "fast"]`).
    pub tier_trace: Vec<String>,
    /// The classifier's initial routing decision.
    pub initial_classification: Tier,
    /// The classifier's confidence for that decision.
    pub initial_confidence: f64,
    /// Why escalation occurred, if it did.
    #[serde(default)]
    pub escalation_reason: Option<String>,
    /// Per-pass token usage, one entry per `tier_trace` entry.
    pub per_pass_usage: Vec<PassUsage>,
    /// Token usage summed across every pass in the turn.
    pub usage_sum: TokenUsage,
    /// Time to first visible content, in milliseconds from turn start.
    #[serde(default)]
    pub ttfc_ms: Option<u64>,
    /// Time to turn completion, in milliseconds from turn start.
    pub ttc_ms: u64,
    /// Count of accepted operations.
    pub operations_accepted: usize,
    /// Count of rejected operations, keyed by rejection reason tag.
    pub operations_rejected: HashMap<String, usize>,
    /// Cost in fractional currency units, computed from per-tier pricing.
    pub cost_usd: Decimal,
    /// The terminal error kind, if the turn ended in one.
    #[serde(default)]
    pub error_kind: Option<ErrorKind>,
    /// Monotonic timestamp (milliseconds since an arbitrary epoch chosen
    /// by the caller — the orchestrator stamps this, this crate never
    /// reads the clock itself).
    pub timestamp_ms: u64,
}

/// The lighter-weight record appended for each direct edit (spec §4.9:
/// "`event_type=direct_edit`, `edit_latency_ms`").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectEditTelemetry {
    /// The aide the edit applied to.
    pub aide_id: AideId,
    /// The user who made the edit.
    pub user_id: UserId,
    /// Wall-clock latency of the edit, from receipt to acceptance/rejection.
    pub edit_latency_ms: u64,
    /// Whether the reducer accepted the edit.
    pub accepted: bool,
    /// Monotonic timestamp, caller-stamped.
    pub timestamp_ms: u64,
}

/// A telemetry record, tagged by kind (spec §4.9 `event_type`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TelemetryRecord {
    /// A completed (or terminally errored) turn.
    Turn(TurnTelemetry),
    /// A direct edit applied outside any turn.
    DirectEdit(DirectEditTelemetry),
}
