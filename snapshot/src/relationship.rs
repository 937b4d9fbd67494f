//! Relationships between entities and their cardinality rules.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// The cardinality recorded for a relationship type on first observation.
/// "First-set wins": once a type's cardinality is recorded, later
/// `rel.set` calls for the same type observe it regardless of the
/// `cardinality` field they pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Many `from` entities may point at one `to` entity via this type,
    /// but each `from` has at most one edge of this type.
    ManyToOne,
    /// Each `from` and each `to` has at most one edge of this type.
    OneToOne,
    /// No uniqueness constraint.
    ManyToMany,
}

/// A single directed, typed edge between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Source entity.
    pub from: EntityId,
    /// Target entity.
    pub to: EntityId,
    /// Relationship type name.
    #[serde(rename = "type")]
    pub rel_type: String,
    /// Arbitrary payload attached to the edge.
    #[serde(default)]
    pub data: serde_json::Value,
    /// Monotonic sequence number assigned when the edge was set.
    pub seq: u64,
}
