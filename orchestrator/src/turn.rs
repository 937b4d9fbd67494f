//! Per-turn mutable state (spec §4.7's state table) and the outcome
//! shapes [`crate::Orchestrator::run_turn`] returns.

use std::collections::HashMap;
use std::time::Instant;

use aide_classify::Tier;
use aide_core::{ErrorKind, TurnId};
use aide_llm::TokenUsage;
use aide_reducer::Operation;
use aide_snapshot::Snapshot;
use aide_telemetry::PassUsage;

/// An escalation request, whether from an explicit `escalate` signal or
/// passively detected after a fast-tier pass completes (spec §4.7).
#[derive(Debug, Clone, PartialEq)]
pub struct EscalateTarget {
    /// The tier to run next.
    pub tier: Tier,
    /// Free-text reason, forwarded to `meta.escalation` and telemetry.
    pub reason: String,
    /// An extracted sub-request, if the signal carried one (spec §8
    /// scenario 4: the analyst's effective question).
    pub extract: Option<String>,
}

/// Everything carried across every pass of one turn. Lives only for the
/// duration of [`crate::Orchestrator::run_turn`] — never persisted
/// itself, only the fields the store collaborator actually wants.
pub struct TurnState {
    /// Stable across every pass of the turn, even across escalation.
    pub turn_id: TurnId,
    /// The working snapshot, updated as operations are accepted.
    pub snapshot: Snapshot,
    /// The snapshot as it stood before the turn's first pass. Restored
    /// on a structural-target rollback (spec §9 resolution 1).
    pub original_snapshot: Snapshot,
    /// Every tier actually run, in order.
    pub tier_trace: Vec<String>,
    /// Accepted operations, in the order they will be persisted. Passes
    /// discarded by a structural-target rollback are removed from here.
    pub operations: Vec<Operation>,
    /// Rejection counts, keyed by the reducer's rejection-reason tag.
    pub rejected: HashMap<String, usize>,
    /// Set once an `escalate` signal is honored or passive detection
    /// fires; consumed (and cleared) by the caller driving the turn.
    pub escalate_target: Option<EscalateTarget>,
    /// Why the turn escalated, for telemetry. Distinct from
    /// `escalate_target` because the latter is cleared as each
    /// escalation is consumed, but the reason should survive to the end.
    pub escalation_reason: Option<String>,
    /// Set by a `clarify` signal; surfaced on [`TurnOutcome`] for the
    /// store collaborator (spec §9 resolution 3).
    pub awaiting_clarification: bool,
    /// Token usage summed across every pass.
    pub usage_sum: TokenUsage,
    /// One entry per pass actually run.
    pub per_pass_usage: Vec<PassUsage>,
    /// Monotonic delta sequence number. Unlike `operations`, never reset
    /// by a rollback — wire `seq` values are unique for the life of the
    /// turn regardless of what gets discarded from persistence.
    pub delta_seq: u64,
    t_start: Instant,
    t_first_content: Option<Instant>,
}

impl TurnState {
    /// Start a fresh turn against the snapshot loaded from the store.
    pub fn new(turn_id: TurnId, snapshot: Snapshot) -> Self {
        Self {
            turn_id,
            original_snapshot: snapshot.clone(),
            snapshot,
            tier_trace: Vec::new(),
            operations: Vec::new(),
            rejected: HashMap::new(),
            escalate_target: None,
            escalation_reason: None,
            awaiting_clarification: false,
            usage_sum: TokenUsage::default(),
            per_pass_usage: Vec::new(),
            delta_seq: 0,
            t_start: Instant::now(),
            t_first_content: None,
        }
    }

    /// Record the first moment any visible output (a delta, a voice
    /// line, or a clarify) reached the client, if not already recorded.
    pub fn mark_first_content(&mut self) {
        if self.t_first_content.is_none() {
            self.t_first_content = Some(Instant::now());
        }
    }

    /// Clear a previously recorded first-content mark. Called when a
    /// structural-target rollback discards the pass that set it — output
    /// from a rolled-back pass never reached the client's final view, so
    /// it must not count as the turn's first visible content.
    pub fn reset_first_content(&mut self) {
        self.t_first_content = None;
    }

    /// Time to first visible content, in milliseconds from turn start.
    pub fn ttfc_ms(&self) -> Option<u64> {
        self.t_first_content
            .map(|t| t.saturating_duration_since(self.t_start).as_millis() as u64)
    }

    /// Time to turn completion, in milliseconds from turn start.
    pub fn ttc_ms(&self) -> u64 {
        self.t_start.elapsed().as_millis() as u64
    }
}

/// How one pass over a single tier ended (spec §4.7's `run_tier` loop).
#[derive(Debug)]
pub enum PassResult {
    /// The stream ended normally (`LlmEvent::End`), with no unhandled
    /// provider error.
    Completed,
    /// The client requested cancellation mid-pass.
    Interrupted,
    /// A terminal error ended the pass.
    Error(ErrorKind),
}

/// Terminal condition of a finalized turn (spec §7 invariant: "exactly
/// one of stream.end/stream.error/stream.interrupted per turn").
#[derive(Debug, Clone, PartialEq)]
pub enum TurnTerminal {
    /// The turn ran to normal completion.
    Completed,
    /// The client interrupted the turn.
    Interrupted,
    /// The turn ended in a terminal error.
    Error(ErrorKind),
}

/// What [`crate::Orchestrator::run_turn`] returns once a turn finalizes.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The turn this outcome describes.
    pub turn_id: TurnId,
    /// Every tier actually run, in order.
    pub tier_trace: Vec<String>,
    /// Count of accepted operations that were actually persisted (after
    /// any rollback).
    pub operations_accepted: usize,
    /// Whether the turn ended on a `clarify` signal awaiting a reply
    /// (spec §9 resolution 3: outbound-only, no in-kernel reconciliation).
    pub awaiting_clarification: bool,
    /// How the turn ended.
    pub terminal: TurnTerminal,
}
