//! Outbound and inbound wire message shapes (spec §4.8, §6.1).

use aide_classify::Tier;
use aide_core::TurnId;
use aide_llm::TokenUsage;
use aide_reducer::Operation;
use rust_decimal::Decimal;
use serde::Deserialize;

/// One accepted operation paired with its per-turn emission sequence
/// number (spec §5: "acceptance order = delta dispatch order").
#[derive(Debug, Clone, PartialEq)]
pub struct Delta {
    /// The accepted operation, abbreviations already expanded on
    /// serialization.
    pub operation: Operation,
    /// Position of this delta within the turn's emitted sequence.
    pub seq: u64,
}

/// A server-to-client event (spec §4.8 table). Envelope names are
/// suggestions; [`OutboundEvent::to_wire_json`] is what actually ships.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// First byte after the user message is received.
    StreamStart {
        /// The turn this stream belongs to.
        turn_id: TurnId,
        /// The classifier's initial routing decision.
        tier: Tier,
    },
    /// One accepted mutation, outside any open batch.
    Delta(Delta),
    /// The buffered deltas from a matched `batch.start`/`batch.end` pair,
    /// or a forced flush, in acceptance order.
    DeltaBatch(Vec<Delta>),
    /// A `voice` signal, forwarded verbatim.
    Voice {
        /// The chat text.
        text: String,
    },
    /// A `clarify` signal, forwarded verbatim.
    Clarify {
        /// The clarifying question.
        text: String,
        /// Suggested answers, if any.
        options: Vec<String>,
    },
    /// Emitted immediately before starting an escalated pass.
    MetaEscalation {
        /// The tier the escalated-from pass ran at.
        from_tier: Tier,
        /// The tier about to run.
        to_tier: Tier,
        /// Why escalation occurred.
        reason: String,
    },
    /// Emitted on each tier transition.
    MetaTierRetrace {
        /// The updated trace, in order.
        tier_trace: Vec<String>,
    },
    /// Exactly once per turn, on normal completion.
    StreamEnd {
        /// The turn that completed.
        turn_id: TurnId,
        /// Every tier actually run, in order.
        tier_trace: Vec<String>,
        /// Token usage summed across every pass.
        usage: TokenUsage,
        /// Time to first visible content, in milliseconds.
        ttfc_ms: Option<u64>,
        /// Time to completion, in milliseconds.
        ttc_ms: u64,
        /// Computed cost in fractional currency units.
        cost_usd: Decimal,
    },
    /// A terminal error (spec §7).
    StreamError {
        /// The machine-readable error tag, e.g. `"Stream.Timeout"`.
        kind: String,
        /// A user-safe message.
        message: String,
    },
    /// Emitted on client-requested cancellation.
    StreamInterrupted {
        /// The turn that was interrupted.
        turn_id: TurnId,
        /// Count of operations accepted before the interrupt.
        operations_applied: usize,
    },
}

fn delta_json(delta: &Delta) -> serde_json::Value {
    let mut payload = delta.operation.to_canonical_json();
    if let serde_json::Value::Object(map) = &mut payload {
        map.insert("kind".to_string(), delta.operation.wire_kind().into());
        map.insert("seq".to_string(), delta.seq.into());
    }
    payload
}

impl OutboundEvent {
    /// Serialize to the wire envelope shape (spec §4.8 table, §6.2's
    /// canonical operation form for deltas).
    pub fn to_wire_json(&self) -> serde_json::Value {
        match self {
            OutboundEvent::StreamStart { turn_id, tier } => serde_json::json!({
                "kind": "stream.start",
                "turn_id": turn_id,
                "tier": tier,
            }),
            OutboundEvent::Delta(delta) => delta_json(delta),
            OutboundEvent::DeltaBatch(deltas) => serde_json::json!({
                "kind": "delta.batch",
                "deltas": deltas.iter().map(delta_json).collect::<Vec<_>>(),
            }),
            OutboundEvent::Voice { text } => serde_json::json!({
                "kind": "voice",
                "text": text,
            }),
            OutboundEvent::Clarify { text, options } => serde_json::json!({
                "kind": "clarify",
                "text": text,
                "options": options,
            }),
            OutboundEvent::MetaEscalation { from_tier, to_tier, reason } => serde_json::json!({
                "kind": "meta.escalation",
                "from_tier": from_tier,
                "to_tier": to_tier,
                "reason": reason,
            }),
            OutboundEvent::MetaTierRetrace { tier_trace } => serde_json::json!({
                "kind": "meta.tier_retrace",
                "tier_trace": tier_trace,
            }),
            OutboundEvent::StreamEnd { turn_id, tier_trace, usage, ttfc_ms, ttc_ms, cost_usd } => {
                serde_json::json!({
                    "kind": "stream.end",
                    "turn_id": turn_id,
                    "tier_trace": tier_trace,
                    "usage": usage,
                    "ttfc_ms": ttfc_ms,
                    "ttc_ms": ttc_ms,
                    "cost_usd": cost_usd,
                })
            }
            OutboundEvent::StreamError { kind, message } => serde_json::json!({
                "kind": "stream.error",
                "error_kind": kind,
                "message": message,
            }),
            OutboundEvent::StreamInterrupted { turn_id, operations_applied } => serde_json::json!({
                "kind": "stream.interrupted",
                "turn_id": turn_id,
                "operations_applied": operations_applied,
            }),
        }
    }
}

/// A client-to-server message (spec §6.1).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind")]
pub enum InboundMessage {
    /// A user utterance.
    #[serde(rename = "message")]
    Message {
        /// The message text.
        content: String,
        /// Client-generated correlation id.
        message_id: String,
    },
    /// A reducer-ready update applied outside any LLM turn.
    #[serde(rename = "direct_edit")]
    DirectEdit {
        /// The operation to apply (spec §4.8: "an `entity.update` op
        /// produced by the UI", though the wire accepts any `Operation`).
        op: Operation,
    },
    /// Cancel the active turn.
    #[serde(rename = "interrupt")]
    Interrupt {},
    /// Test-only: select the mock LLM's pacing profile.
    #[serde(rename = "set_profile")]
    SetProfile {
        /// The profile name (`"instant"`, `"fast-l2"`, `"structural-l3"`,
        /// `"slow"`).
        profile: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use aide_snapshot::Cardinality;
    use serde_json::Map;

    #[test]
    fn stream_start_has_expected_shape() {
        let event = OutboundEvent::StreamStart { turn_id: TurnId::new("t1"), tier: Tier::Fast };
        let json = event.to_wire_json();
        assert_eq!(json["kind"], "stream.start");
        assert_eq!(json["tier"], "fast");
    }

    #[test]
    fn delta_expands_operation_and_tags_kind() {
        let delta = Delta {
            operation: Operation::EntityUpdate {
                r#ref: "guest_linda".to_string(),
                props: Map::new(),
            },
            seq: 3,
        };
        let json = OutboundEvent::Delta(delta).to_wire_json();
        assert_eq!(json["kind"], "delta.entity");
        assert_eq!(json["type"], "entity.update");
        assert_eq!(json["seq"], 3);
    }

    #[test]
    fn delta_batch_wraps_every_buffered_delta() {
        let deltas = vec![
            Delta {
                operation: Operation::RelSet {
                    from: "a".to_string(),
                    to: "b".to_string(),
                    rel_type: "member_of".to_string(),
                    cardinality: Some(Cardinality::ManyToOne),
                    data: serde_json::Value::Null,
                },
                seq: 1,
            },
            Delta { operation: Operation::MetaSet { props: Map::new() }, seq: 2 },
        ];
        let json = OutboundEvent::DeltaBatch(deltas).to_wire_json();
        assert_eq!(json["kind"], "delta.batch");
        assert_eq!(json["deltas"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn inbound_message_deserializes_by_kind_tag() {
        let json = r#"{"kind":"interrupt"}"#;
        let msg: InboundMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg, InboundMessage::Interrupt {});

        let json = r#"{"kind":"message","content":"hi","message_id":"m1"}"#;
        let msg: InboundMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            InboundMessage::Message { content: "hi".to_string(), message_id: "m1".to_string() }
        );
    }
}
