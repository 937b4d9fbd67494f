//! Wire operations and signals (spec §4.2, §4.3).
//!
//! The line splitter (`aide-parse`) deserializes each complete JSONL line
//! directly into a [`Line`], which is tagged on the abbreviated wire key
//! `t` and reads each variant's fields under their abbreviated wire
//! names (`p` for props, `ref` for ref, ...). This *is* the abbreviation
//! expansion spec §4.3 describes: everything downstream of this type
//! (the reducer, the orchestrator, the session) only ever sees these
//! Rust field names, never the wire abbreviations.
//!
//! One wrinkle spec §4.2/§6.2 leaves ambiguous: `rel.set`/`rel.remove`
//! already spell their relationship-type field as the literal word
//! `type`, while the abbreviation table separately maps the top-level
//! discriminant `t` to the word `type`. Renaming both to the same key
//! before dispatch would collide. We resolve this by tagging on the
//! wire's literal `t` (never renamed) and letting each variant's fields
//! keep their own wire names — `type` only ever means "relationship
//! type" inside a `rel.*` variant, so the collision is avoidance by
//! construction, not by the wire format. See DESIGN.md.

use aide_snapshot::Cardinality;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A mutating operation, as it arrives after JSONL decode. Each one that
/// the reducer accepts produces exactly one delta on the wire (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Operation {
    /// Merge `props` into the snapshot's page-level meta.
    #[serde(rename = "meta.set")]
    MetaSet {
        /// Fields to merge into meta.
        #[serde(rename = "p", default)]
        props: Map<String, Value>,
    },

    /// Create an entity, if every invariant in spec §3 holds.
    #[serde(rename = "entity.create")]
    EntityCreate {
        /// New entity's id.
        id: String,
        /// Parent id, or `"root"`.
        parent: String,
        /// Rendering hint.
        #[serde(default)]
        display: Option<aide_snapshot::Display>,
        /// Initial props.
        #[serde(rename = "p", default)]
        props: Map<String, Value>,
    },

    /// Merge `props` into an existing entity addressed by `ref`.
    #[serde(rename = "entity.update")]
    EntityUpdate {
        /// Bare id or `id/field/child_id` path.
        #[serde(rename = "ref")]
        r#ref: String,
        /// Fields to merge.
        #[serde(rename = "p", default)]
        props: Map<String, Value>,
    },

    /// Soft-delete the subtree rooted at `ref`.
    #[serde(rename = "entity.remove")]
    EntityRemove {
        /// Bare id or path.
        #[serde(rename = "ref")]
        r#ref: String,
    },

    /// Reparent an entity, optionally at a specific sibling position.
    #[serde(rename = "entity.move")]
    EntityMove {
        /// Bare id or path of the entity to move.
        #[serde(rename = "ref")]
        r#ref: String,
        /// New parent id.
        parent: String,
        /// Sibling insertion index, clamped to `[0, len]`. Appends if
        /// omitted.
        #[serde(default)]
        position: Option<usize>,
    },

    /// Replace the sibling order of `ref`'s non-removed children.
    #[serde(rename = "entity.reorder")]
    EntityReorder {
        /// Bare id or path of the parent whose children are reordered.
        #[serde(rename = "ref")]
        r#ref: String,
        /// The full new order. Must be exactly the set of living
        /// children, or the op is rejected with `ReorderMismatch`.
        children: Vec<String>,
    },

    /// Create or replace a typed edge.
    #[serde(rename = "rel.set")]
    RelSet {
        /// Source entity id.
        from: String,
        /// Target entity id.
        to: String,
        /// Relationship type name. Never abbreviated on the wire — see
        /// the module doc for why.
        #[serde(rename = "type")]
        rel_type: String,
        /// Cardinality, honored only on first observation of `type`.
        #[serde(default)]
        cardinality: Option<Cardinality>,
        /// Arbitrary payload attached to the edge.
        #[serde(default)]
        data: Value,
    },

    /// Drop a specific edge.
    #[serde(rename = "rel.remove")]
    RelRemove {
        /// Source entity id.
        from: String,
        /// Target entity id.
        to: String,
        /// Relationship type name.
        #[serde(rename = "type")]
        rel_type: String,
    },

    /// Best-effort merge into page-level style.
    #[serde(rename = "style.set")]
    StyleSet {
        /// Fields to merge.
        #[serde(rename = "p", default)]
        props: Map<String, Value>,
    },

    /// Best-effort merge into one entity's style props.
    #[serde(rename = "style.entity")]
    StyleEntity {
        /// Bare id or path.
        #[serde(rename = "ref")]
        r#ref: String,
        /// Fields to merge.
        #[serde(rename = "p", default)]
        props: Map<String, Value>,
    },

    /// Best-effort merge into meta annotations.
    #[serde(rename = "meta.annotate")]
    MetaAnnotate {
        /// Fields to merge.
        #[serde(rename = "p", default)]
        props: Map<String, Value>,
    },
}

impl Operation {
    /// The wire-level `t` tag for this operation, e.g. `"entity.create"`.
    /// Used by telemetry and logging, never by the reducer itself.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Operation::MetaSet { .. } => "meta.set",
            Operation::EntityCreate { .. } => "entity.create",
            Operation::EntityUpdate { .. } => "entity.update",
            Operation::EntityRemove { .. } => "entity.remove",
            Operation::EntityMove { .. } => "entity.move",
            Operation::EntityReorder { .. } => "entity.reorder",
            Operation::RelSet { .. } => "rel.set",
            Operation::RelRemove { .. } => "rel.remove",
            Operation::StyleSet { .. } => "style.set",
            Operation::StyleEntity { .. } => "style.entity",
            Operation::MetaAnnotate { .. } => "meta.annotate",
        }
    }

    /// Which of the four outbound delta kinds (spec §4.8) this
    /// operation's type belongs to.
    pub fn wire_kind(&self) -> &'static str {
        match self {
            Operation::MetaSet { .. } | Operation::MetaAnnotate { .. } => "delta.meta",
            Operation::EntityCreate { .. }
            | Operation::EntityUpdate { .. }
            | Operation::EntityRemove { .. }
            | Operation::EntityMove { .. }
            | Operation::EntityReorder { .. } => "delta.entity",
            Operation::RelSet { .. } | Operation::RelRemove { .. } => "delta.rel",
            Operation::StyleSet { .. } | Operation::StyleEntity { .. } => "delta.style",
        }
    }

    /// The canonical (expanded) wire form (spec §6.2): the same payload
    /// the abbreviated form decodes from, but with `t` renamed to `type`
    /// and `p` renamed to `props`. Used when emitting a delta over a
    /// session, never internally.
    pub fn to_canonical_json(&self) -> Value {
        let mut value = serde_json::to_value(self).expect("Operation always serializes");
        if let Value::Object(map) = &mut value {
            if let Some(t) = map.remove("t") {
                map.insert("type".to_string(), t);
            }
            if let Some(p) = map.remove("p") {
                map.insert("props".to_string(), p);
            }
        }
        value
    }
}

/// A non-mutating instruction to the orchestrator (spec §4.2). The
/// reducer never applies these; `aide-orchestrator` consumes them
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Signal {
    /// A chat-channel line of text to forward to the client verbatim.
    #[serde(rename = "voice")]
    Voice {
        /// The text.
        text: String,
    },

    /// A request to re-run (part of) this turn at a different tier.
    #[serde(rename = "escalate")]
    Escalate {
        /// Target tier name (`"structural"` or `"analyst"`).
        tier: String,
        /// Free-text reason, propagated to telemetry and
        /// `meta.escalation`.
        reason: String,
        /// Optional extracted sub-request (e.g. the question text for
        /// an analyst escalation).
        #[serde(default)]
        extract: Option<String>,
    },

    /// A request for the user to disambiguate before continuing.
    #[serde(rename = "clarify")]
    Clarify {
        /// The clarifying question.
        text: String,
        /// Suggested answers, if any.
        #[serde(default)]
        options: Vec<String>,
    },

    /// Begin buffering deltas for atomic delivery.
    #[serde(rename = "batch.start")]
    BatchStart,

    /// Flush the buffered deltas as one `delta.batch` event.
    #[serde(rename = "batch.end")]
    BatchEnd,
}
