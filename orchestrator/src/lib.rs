//! Streaming orchestration kernel (C7) — the heart of the system.
//!
//! [`Orchestrator`] is the [`SessionHandler`] implementation that turns
//! one inbound chat message into a classified, possibly-escalated,
//! possibly-multi-pass LLM turn: assemble a prompt, open a streaming
//! call, split its output into JSONL lines, reduce each operation line
//! against the working snapshot, and fan accepted deltas out over the
//! session's [`BatchingSink`]. Direct edits bypass all of that and go
//! straight to the reducer. Every terminated turn is persisted once and
//! recorded to telemetry exactly once.
//!
//! Grounded on `neuron-op-react`'s `ReactOperator`: a loop holding
//! per-request mutable state, alternating "call the model" with
//! "interpret what it asked for," under hook-style checkpoints (here,
//! tier boundaries and escalation) and the same halt-preserves-partial-
//! progress discipline. The tool-calling ReAct loop becomes a tiered,
//! line-oriented streaming loop; the hook registry becomes explicit
//! escalation/timeout/cancellation handling, since this system has a
//! closed, specified set of checkpoints rather than arbitrary observers.

#![deny(missing_docs)]

mod clock;
mod escalation;
mod turn;

pub use turn::{EscalateTarget, PassResult, TurnOutcome, TurnTerminal};

use std::ops::Range;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use aide_classify::{classify, Classification, Tier};
use aide_core::store::ConversationTailEntry;
use aide_core::{AideId, ErrorKind, OrchestratorConfig, ProviderErrorKind, TurnId, UserId};
use aide_llm::{LlmClient, LlmEvent, SamplingParams, StreamRequest};
use aide_llm_mock::{PacingControl, PacingProfile};
use aide_parse::{split_lines_with_limit, ParsedLine};
use aide_prompt::{assemble_messages, assemble_system_blocks, build_tool_schemas, HistoryTurn};
use aide_reducer::{reduce, Operation, Outcome, RejectionReason, Signal};
use aide_session::{BatchingSink, Delta, DeltaSink, OutboundEvent, SessionHandler, SessionIdentity};
use aide_snapshot::Snapshot;
use aide_telemetry::{
    compute_cost_usd, DirectEditTelemetry, PassUsage, TelemetryRecord, TelemetryRecorder,
    TurnTelemetry,
};

use turn::TurnState;

/// Everything one session's turns are driven against. Shared behind an
/// `Arc` so [`Orchestrator`] is cheap to clone into a spawned task
/// without the spawned task borrowing from the caller (spec §5: the
/// inbound read loop must keep running — to interleave an `interrupt`
/// with an in-flight turn — while a turn's own work happens elsewhere).
struct Inner<S: DeltaSink + 'static> {
    config: OrchestratorConfig,
    llm: Arc<dyn LlmClient>,
    pacing: Option<Arc<dyn PacingControl>>,
    store: Arc<dyn aide_core::SnapshotStore>,
    telemetry: Arc<dyn TelemetryRecorder>,
    sink: Arc<BatchingSink<S>>,
    identity: SessionIdentity,
    /// Serializes turns: a spawned turn task holds this for its whole
    /// run, so a second inbound message queues behind it (spec §5:
    /// "a new user message is queued until the prior turn finalizes").
    turn_gate: tokio::sync::Mutex<()>,
    /// The currently running turn's cancellation token, if any. Plain
    /// `std::sync::Mutex` since it's only ever held for a pointer copy.
    active_cancel: StdMutex<Option<CancellationToken>>,
}

/// The [`SessionHandler`] that drives turns for one connected session.
/// Cheap to clone — clones share the same state via `Arc`.
pub struct Orchestrator<S: DeltaSink + 'static> {
    inner: Arc<Inner<S>>,
}

impl<S: DeltaSink + 'static> Clone for Orchestrator<S> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<S: DeltaSink + 'static> Orchestrator<S> {
    /// Build an orchestrator for one session. `pacing` should be
    /// `Some` only when `llm` is backed by `aide-llm-mock`'s replay
    /// client — it's how `set_profile` (spec §6.1) retunes it.
    pub fn new(
        config: OrchestratorConfig,
        llm: Arc<dyn LlmClient>,
        pacing: Option<Arc<dyn PacingControl>>,
        store: Arc<dyn aide_core::SnapshotStore>,
        telemetry: Arc<dyn TelemetryRecorder>,
        sink: Arc<BatchingSink<S>>,
        identity: SessionIdentity,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                llm,
                pacing,
                store,
                telemetry,
                sink,
                identity,
                turn_gate: tokio::sync::Mutex::new(()),
                active_cancel: StdMutex::new(None),
            }),
        }
    }

    /// Run one turn to completion and return its outcome. This is the
    /// primary entry point for tests; [`SessionHandler::on_message`]
    /// is a thin wire adapter over it that spawns it so the inbound
    /// loop can keep reading (spec §5).
    pub async fn run_turn(&self, content: &str, message_id: &str) -> TurnOutcome {
        let _turn_permit = self.inner.turn_gate.lock().await;
        let _ = message_id; // correlation is client-side; no wire event echoes it back.

        let cancel = CancellationToken::new();
        *self.inner.active_cancel.lock().expect("active_cancel poisoned") = Some(cancel.clone());

        let outcome = self.run_turn_locked(content, &cancel).await;

        *self.inner.active_cancel.lock().expect("active_cancel poisoned") = None;
        outcome
    }

    async fn run_turn_locked(&self, content: &str, cancel: &CancellationToken) -> TurnOutcome {
        let turn_id = TurnId::new(uuid::Uuid::new_v4().to_string());

        let (snapshot, tail) = match self.inner.store.load_turn_context(&self.inner.identity.aide_id).await {
            Ok(v) => v,
            Err(err) => {
                let kind = ErrorKind::StoreUnavailable(err.to_string());
                self.emit_error(&kind).await;
                self.record_failed_load_telemetry(&turn_id, &kind).await;
                return TurnOutcome {
                    turn_id,
                    tier_trace: Vec::new(),
                    operations_accepted: 0,
                    awaiting_clarification: false,
                    terminal: TurnTerminal::Error(kind),
                };
            }
        };

        let history: Vec<HistoryTurn> = tail.iter().map(to_history_turn).collect();
        // The wire protocol's `message` shape carries no attachment field
        // (spec §6.1); image-aware routing is therefore unreachable from
        // this kernel's inbound surface today and always classifies as if
        // text-only.
        let classification = classify(content, &snapshot, false);

        self.inner
            .sink
            .send_direct(OutboundEvent::StreamStart { turn_id: turn_id.clone(), tier: classification.tier })
            .await;

        let mut state = TurnState::new(turn_id.clone(), snapshot);
        let result = self.drive_turn(classification.tier, content, &history, &mut state, cancel).await;

        self.finalize(state, classification, content, result).await
    }

    /// Runs the initial tier, then the escalation two-pass sequence if
    /// an `escalate` signal (explicit or passively detected) fires
    /// (spec §4.7).
    async fn drive_turn(
        &self,
        initial_tier: Tier,
        content: &str,
        history: &[HistoryTurn],
        state: &mut TurnState,
        cancel: &CancellationToken,
    ) -> PassResult {
        let pass = self.run_tier(initial_tier, content, history, state, cancel).await;
        state.tier_trace.push(initial_tier.as_str().to_string());
        self.emit_tier_retrace(state).await;

        if !matches!(pass.result, PassResult::Completed) {
            return pass.result;
        }

        if state.escalate_target.is_none() && initial_tier == Tier::Fast {
            let pass_ops = &state.operations[pass.ops_range.clone()];
            if let Some(target) = escalation::detect_passive_escalation(pass_ops, &pass.voice_texts, &state.snapshot) {
                state.escalate_target = Some(target);
            }
        }

        let Some(target) = state.escalate_target.take() else {
            return pass.result;
        };

        state.escalation_reason = Some(target.reason.clone());
        // Rollback-and-redo only applies to a structural escalation: the
        // fast pass's attempt was structurally wrong and gets discarded
        // in favor of the structural tier's redo. An analyst escalation
        // is a query riding alongside an already-correct mutation — the
        // mutation stands, and the analyst pass answers against the
        // post-mutation snapshot (spec §8 scenario 4).
        let rollback = target.tier == Tier::Structural;
        if rollback {
            state.operations.truncate(pass.ops_range.start);
            state.snapshot = state.original_snapshot.clone();
            // The discarded pass may have already marked first content
            // (a delta, voice line, or clarify emitted before escalation
            // fired); none of that reached the client's final view.
            state.reset_first_content();
        }

        self.inner
            .sink
            .send_direct(OutboundEvent::MetaEscalation {
                from_tier: initial_tier,
                to_tier: target.tier,
                reason: target.reason.clone(),
            })
            .await;

        let effective_message = target.extract.clone().unwrap_or_else(|| content.to_string());
        let escalated = self.run_tier(target.tier, &effective_message, history, state, cancel).await;
        state.tier_trace.push(target.tier.as_str().to_string());
        self.emit_tier_retrace(state).await;

        if !matches!(escalated.result, PassResult::Completed) {
            return escalated.result;
        }

        // Spec §4.7: having compiled the user's mutation intent against
        // the new structure, retry the original tier. Only meaningful
        // after a structural rollback starting from fast — an analyst
        // escalation answered its query against the standing mutation
        // and has nothing left to retry (spec §8 scenario 4).
        if rollback && initial_tier == Tier::Fast {
            let retry = self.run_tier(Tier::Fast, content, history, state, cancel).await;
            state.tier_trace.push(Tier::Fast.as_str().to_string());
            self.emit_tier_retrace(state).await;
            retry.result
        } else {
            escalated.result
        }
    }

    async fn emit_tier_retrace(&self, state: &TurnState) {
        self.inner
            .sink
            .send_direct(OutboundEvent::MetaTierRetrace { tier_trace: state.tier_trace.clone() })
            .await;
    }

    /// One tier's streaming pass, with a single 1s-backoff retry for a
    /// retryable provider error that produced no visible output (spec
    /// §7: `Provider.Unreachable`/`Provider.RateLimited` are retried up
    /// to one attempt).
    async fn run_tier(
        &self,
        tier: Tier,
        user_message: &str,
        history: &[HistoryTurn],
        state: &mut TurnState,
        cancel: &CancellationToken,
    ) -> PassOutput {
        let attempt = self.run_tier_attempt(tier, user_message, history, state, cancel).await;
        if let PassResult::Error(ErrorKind::Provider(p)) = &attempt.result {
            let retryable = ErrorKind::Provider(p.clone()).is_retryable();
            if retryable && attempt.ops_range.is_empty() && attempt.voice_texts.is_empty() {
                tokio::time::sleep(Duration::from_secs(1)).await;
                return self.run_tier_attempt(tier, user_message, history, state, cancel).await;
            }
        }
        attempt
    }

    async fn run_tier_attempt(
        &self,
        tier: Tier,
        user_message: &str,
        history: &[HistoryTurn],
        state: &mut TurnState,
        cancel: &CancellationToken,
    ) -> PassOutput {
        let today = clock::today_utc_date();
        let system_blocks = assemble_system_blocks(tier, &state.snapshot, &self.inner.config.prompt_version, &today);
        let messages = assemble_messages(history, self.inner.config.history_window_turns, user_message);
        let tools = build_tool_schemas(tier);
        let request = StreamRequest {
            model: self.inner.config.model_for(tier.as_str()).to_string(),
            system_blocks,
            messages,
            tools,
            sampling: SamplingParams::default(),
        };

        let llm_stream = self.inner.llm.stream(request).await;
        let (chunk_tx, mut chunk_rx) = mpsc::channel::<String>(32);
        let usage_cell: Arc<StdMutex<aide_llm::TokenUsage>> = Arc::new(StdMutex::new(aide_llm::TokenUsage::default()));
        let terminal_cell: Arc<StdMutex<Option<Result<(), ProviderErrorKind>>>> = Arc::new(StdMutex::new(None));

        let pump_usage = usage_cell.clone();
        let pump_terminal = terminal_cell.clone();
        let pump = tokio::spawn(async move {
            let mut llm_stream = llm_stream;
            while let Some(event) = llm_stream.next().await {
                match event {
                    LlmEvent::TextChunk(text) => {
                        if chunk_tx.send(text).await.is_err() {
                            break;
                        }
                    }
                    LlmEvent::UsageStats(usage) => {
                        *pump_usage.lock().expect("usage mutex poisoned") = usage;
                    }
                    LlmEvent::End => {
                        *pump_terminal.lock().expect("terminal mutex poisoned") = Some(Ok(()));
                        break;
                    }
                    LlmEvent::ProviderError(e) => {
                        *pump_terminal.lock().expect("terminal mutex poisoned") = Some(Err(e));
                        break;
                    }
                }
            }
        });

        let chunks = async_stream::stream! {
            while let Some(c) = chunk_rx.recv().await {
                yield c;
            }
        };
        let mut lines = Box::pin(split_lines_with_limit(chunks, self.inner.config.parse_failure_streak_limit));

        let ops_start = state.operations.len();
        let mut voice_texts = Vec::new();
        let timeout_ms = self.inner.config.timeout_ms_for(tier.as_str());
        let deadline = tokio::time::sleep(Duration::from_millis(timeout_ms));
        tokio::pin!(deadline);

        let result = loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    pump.abort();
                    break PassResult::Interrupted;
                }
                _ = &mut deadline => {
                    pump.abort();
                    break PassResult::Error(ErrorKind::StreamTimeout { tier_ms: timeout_ms });
                }
                maybe_line = lines.next() => {
                    match maybe_line {
                        None => break PassResult::Completed,
                        Some(ParsedLine::Operation(op)) => {
                            self.apply_operation(tier, op, state).await;
                        }
                        Some(ParsedLine::Signal(Signal::Voice { text })) => {
                            self.inner.sink.send_direct(OutboundEvent::Voice { text: text.clone() }).await;
                            state.mark_first_content();
                            voice_texts.push(text);
                        }
                        Some(ParsedLine::Signal(Signal::Escalate { tier: tier_name, reason, extract })) => {
                            let target_tier = Tier::parse(&tier_name).unwrap_or(Tier::Structural);
                            state.escalate_target = Some(EscalateTarget { tier: target_tier, reason, extract });
                        }
                        Some(ParsedLine::Signal(Signal::Clarify { text, options })) => {
                            self.inner.sink.send_direct(OutboundEvent::Clarify { text: text.clone(), options }).await;
                            state.mark_first_content();
                            state.awaiting_clarification = true;
                        }
                        Some(ParsedLine::Signal(Signal::BatchStart)) => {
                            self.inner.sink.start_batch().await;
                        }
                        Some(ParsedLine::Signal(Signal::BatchEnd)) => {
                            self.inner.sink.end_batch().await;
                        }
                        Some(ParsedLine::ParseFailure) => {
                            pump.abort();
                            break if tier == Tier::Fast {
                                state.escalate_target = Some(EscalateTarget {
                                    tier: Tier::Structural,
                                    reason: "parse_failure_streak".to_string(),
                                    extract: None,
                                });
                                PassResult::Completed
                            } else {
                                PassResult::Error(ErrorKind::StreamParseFailureStreak)
                            };
                        }
                    }
                }
            }
        };

        self.inner.sink.flush_open_batch().await;
        let _ = pump.await;

        let usage = *usage_cell.lock().expect("usage mutex poisoned");
        state.usage_sum.add_assign(&usage);
        state.per_pass_usage.push(PassUsage { tier: tier.as_str().to_string(), usage });

        let result = if matches!(result, PassResult::Completed) {
            match terminal_cell.lock().expect("terminal mutex poisoned").take() {
                Some(Err(provider_err)) => PassResult::Error(ErrorKind::Provider(provider_err)),
                _ => PassResult::Completed,
            }
        } else {
            result
        };

        PassOutput { result, voice_texts, ops_range: ops_start..state.operations.len() }
    }

    /// Reduce one parsed operation line. Analyst is query-only: any
    /// accepted operation is discarded defensively rather than applied
    /// (spec §4.7, analyst tier).
    async fn apply_operation(&self, tier: Tier, op: Operation, state: &mut TurnState) {
        if tier == Tier::Analyst {
            *state.rejected.entry("AnalystDiscarded".to_string()).or_insert(0) += 1;
            return;
        }

        let (next_snapshot, outcome) = reduce(&state.snapshot, &op);
        match outcome {
            Outcome::Accepted => {
                state.snapshot = next_snapshot;
                let seq = state.delta_seq;
                state.delta_seq += 1;
                state.mark_first_content();
                self.inner.sink.send_delta(Delta { operation: op.clone(), seq }).await;
                state.operations.push(op);
            }
            Outcome::Rejected { reason } => {
                *state.rejected.entry(rejection_tag(reason)).or_insert(0) += 1;
            }
        }
    }

    async fn finalize(
        &self,
        state: TurnState,
        classification: Classification,
        user_message: &str,
        pass_result: PassResult,
    ) -> TurnOutcome {
        let mut terminal = match pass_result {
            PassResult::Completed => TurnTerminal::Completed,
            PassResult::Interrupted => TurnTerminal::Interrupted,
            PassResult::Error(e) => TurnTerminal::Error(e),
        };

        if matches!(terminal, TurnTerminal::Completed | TurnTerminal::Interrupted) {
            if let Err(err) = self
                .inner
                .store
                .append_turn(&self.inner.identity.aide_id, state.turn_id.as_str(), user_message, &state.operations, &state.snapshot)
                .await
            {
                terminal = TurnTerminal::Error(ErrorKind::StoreUnavailable(err.to_string()));
            }
        }

        let cost = self.compute_turn_cost(&state);

        match &terminal {
            TurnTerminal::Completed => {
                self.inner
                    .sink
                    .send_direct(OutboundEvent::StreamEnd {
                        turn_id: state.turn_id.clone(),
                        tier_trace: state.tier_trace.clone(),
                        usage: state.usage_sum,
                        ttfc_ms: state.ttfc_ms(),
                        ttc_ms: state.ttc_ms(),
                        cost_usd: cost,
                    })
                    .await;
            }
            TurnTerminal::Interrupted => {
                self.inner
                    .sink
                    .send_direct(OutboundEvent::StreamInterrupted {
                        turn_id: state.turn_id.clone(),
                        operations_applied: state.operations.len(),
                    })
                    .await;
            }
            TurnTerminal::Error(kind) => {
                self.emit_error(kind).await;
            }
        }

        let error_kind = match &terminal {
            TurnTerminal::Error(k) => Some(k.clone()),
            _ => None,
        };

        let record = TelemetryRecord::Turn(TurnTelemetry {
            turn_id: state.turn_id.clone(),
            aide_id: self.inner.identity.aide_id.clone(),
            user_id: self.inner.identity.user_id.clone(),
            session_id: None,
            tier_trace: state.tier_trace.clone(),
            initial_classification: classification.tier,
            initial_confidence: classification.confidence,
            escalation_reason: state.escalation_reason.clone(),
            per_pass_usage: state.per_pass_usage.clone(),
            usage_sum: state.usage_sum,
            ttfc_ms: state.ttfc_ms(),
            ttc_ms: state.ttc_ms(),
            operations_accepted: state.operations.len(),
            operations_rejected: state.rejected.clone(),
            cost_usd: cost,
            error_kind,
            timestamp_ms: clock::now_ms(),
        });
        self.inner.telemetry.record_final(record).await;

        TurnOutcome {
            turn_id: state.turn_id,
            tier_trace: state.tier_trace,
            operations_accepted: state.operations.len(),
            awaiting_clarification: state.awaiting_clarification,
            terminal,
        }
    }

    /// Cost is computed per pass against that pass's own tier pricing,
    /// then summed — an escalated turn runs different tiers (and thus
    /// different models/rates) in the same turn, so costing the summed
    /// usage against a single tier's pricing would misprice every
    /// escalated turn.
    fn compute_turn_cost(&self, state: &TurnState) -> rust_decimal::Decimal {
        state.per_pass_usage.iter().fold(rust_decimal::Decimal::ZERO, |acc, pass| {
            let pricing = self.inner.config.pricing.get(&pass.tier).cloned().unwrap_or_default();
            acc + compute_cost_usd(&pass.usage, &pricing)
        })
    }

    async fn emit_error(&self, kind: &ErrorKind) {
        self.inner
            .sink
            .send_direct(OutboundEvent::StreamError { kind: kind.tag().to_string(), message: kind.to_string() })
            .await;
    }

    async fn record_failed_load_telemetry(&self, turn_id: &TurnId, kind: &ErrorKind) {
        let record = TelemetryRecord::Turn(TurnTelemetry {
            turn_id: turn_id.clone(),
            aide_id: self.inner.identity.aide_id.clone(),
            user_id: self.inner.identity.user_id.clone(),
            session_id: None,
            tier_trace: Vec::new(),
            initial_classification: Tier::Fast,
            initial_confidence: 0.0,
            escalation_reason: None,
            per_pass_usage: Vec::new(),
            usage_sum: aide_llm::TokenUsage::default(),
            ttfc_ms: None,
            ttc_ms: 0,
            operations_accepted: 0,
            operations_rejected: Default::default(),
            cost_usd: rust_decimal::Decimal::ZERO,
            error_kind: Some(kind.clone()),
            timestamp_ms: clock::now_ms(),
        });
        self.inner.telemetry.record_final(record).await;
    }

    /// Bypasses the classifier/LLM/prompt assembler entirely: a direct
    /// edit is reduced straight against the loaded snapshot (spec §6.1).
    pub async fn handle_direct_edit(&self, op: Operation) {
        let started = std::time::Instant::now();
        let (snapshot, _tail) = match self.inner.store.load_turn_context(&self.inner.identity.aide_id).await {
            Ok(v) => v,
            Err(err) => {
                self.emit_error(&ErrorKind::StoreUnavailable(err.to_string())).await;
                return;
            }
        };

        let (next_snapshot, outcome) = reduce(&snapshot, &op);
        let accepted = outcome.is_accepted();

        if accepted {
            if let Err(err) = self.inner.store.append_direct_edit(&self.inner.identity.aide_id, &op, &next_snapshot).await {
                self.emit_error(&ErrorKind::StoreUnavailable(err.to_string())).await;
                return;
            }
            self.inner.sink.send_direct(OutboundEvent::Delta(Delta { operation: op, seq: 0 })).await;
        }

        let record = TelemetryRecord::DirectEdit(DirectEditTelemetry {
            aide_id: self.inner.identity.aide_id.clone(),
            user_id: self.inner.identity.user_id.clone(),
            edit_latency_ms: started.elapsed().as_millis() as u64,
            accepted,
            timestamp_ms: clock::now_ms(),
        });
        self.inner.telemetry.record_final(record).await;
    }

    /// Cancel the currently active turn, if any. A no-op if no turn is
    /// in flight. No rollback: whatever was accepted stays accepted
    /// (spec §7, `Stream.Cancelled`).
    pub async fn interrupt(&self) {
        let cancel = self.inner.active_cancel.lock().expect("active_cancel poisoned").clone();
        if let Some(cancel) = cancel {
            cancel.cancel();
        }
    }

    /// Retune the mock LLM's replay pacing (spec §6.1's `set_profile`
    /// message). A no-op when this orchestrator was built without a
    /// pacing handle, i.e. whenever it's backed by a real provider.
    pub fn set_pacing(&self, profile_name: &str) {
        if let Some(pacing) = &self.inner.pacing {
            pacing.set_pacing(PacingProfile::from_name(profile_name));
        }
    }
}

#[async_trait]
impl<S: DeltaSink + 'static> SessionHandler for Orchestrator<S> {
    async fn on_message(&self, content: String, message_id: String) {
        // Spawned rather than awaited inline: the inbound read loop
        // (`aide_session::run_inbound_loop`) awaits this call before
        // reading the next frame, and a client must be able to send
        // `interrupt` while a turn is still streaming. `turn_gate`
        // still serializes turns, just from inside the spawned task
        // rather than by blocking the reader.
        let this = self.clone();
        tokio::spawn(async move {
            this.run_turn(&content, &message_id).await;
        });
    }

    async fn on_direct_edit(&self, op: Operation) {
        self.handle_direct_edit(op).await;
    }

    async fn on_interrupt(&self) {
        self.interrupt().await;
    }

    async fn on_set_profile(&self, profile: String) {
        self.set_pacing(&profile);
    }
}

/// What one tier pass produced, beyond the pass/fail [`PassResult`]:
/// which of `state.operations` belong to it, and its voice lines (for
/// passive-escalation detection, which must see only this pass's own
/// output).
struct PassOutput {
    result: PassResult,
    voice_texts: Vec<String>,
    ops_range: Range<usize>,
}

fn to_history_turn(entry: &ConversationTailEntry) -> HistoryTurn {
    match entry {
        ConversationTailEntry::User { text } => HistoryTurn::User { text: text.clone() },
        ConversationTailEntry::AssistantSummary { summary } => HistoryTurn::AssistantVoice { text: summary.clone() },
    }
}

fn rejection_tag(reason: RejectionReason) -> String {
    match reason {
        RejectionReason::UnknownType => "UnknownType",
        RejectionReason::MalformedPayload => "MalformedPayload",
        RejectionReason::MissingParent => "MissingParent",
        RejectionReason::DuplicateId => "DuplicateId",
        RejectionReason::MissingRef => "MissingRef",
        RejectionReason::RefRemoved => "RefRemoved",
        RejectionReason::CyclicMove => "CyclicMove",
        RejectionReason::ReorderMismatch => "ReorderMismatch",
        RejectionReason::CardinalityClash => "CardinalityClash",
        RejectionReason::InvariantViolation => "InvariantViolation",
    }
    .to_string()
}
