//! Entity and supporting wire types for the snapshot model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Short, stable identifier for an entity within a snapshot. Plain string
/// underneath, but distinct from a turn id or a relationship type string.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Create a new entity id from anything that converts to `String`.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The reserved parent value for the single page-root entity.
pub const ROOT: &str = "root";

/// A small enumerated rendering hint for an entity. Entities may omit it
/// entirely (`None`), in which case the client falls back to its own
/// defaults.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Display {
    /// The single page root.
    Page,
    /// A named grouping of other entities.
    Section,
    /// A small block of related props.
    Card,
    /// An ordered list of similar entities.
    List,
    /// A tabular collection of rows.
    Table,
    /// A checklist of items with a done/not-done state.
    Checklist,
    /// A single highlighted number.
    Metric,
    /// Freeform text.
    Text,
    /// An image.
    Image,
    /// A row within a table.
    Row,
}

/// One node in the entity tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier for the lifetime of the entity.
    pub id: EntityId,
    /// The parent's id, or [`ROOT`] for the single page entity.
    pub parent: String,
    /// Rendering hint, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
    /// Arbitrary props: field name to JSON scalar or array-of-scalar.
    /// Schema is inferred from the values actually present.
    pub props: serde_json::Map<String, serde_json::Value>,
    /// Soft-delete tombstone.
    #[serde(rename = "_removed")]
    pub removed: bool,
    /// Global creation sequence number.
    #[serde(rename = "_created_seq")]
    pub created_seq: u64,
    /// Global sequence number of the entity's most recent update.
    #[serde(rename = "_updated_seq")]
    pub updated_seq: u64,
}

impl Entity {
    /// Whether this entity's parent is the reserved root sentinel.
    pub fn is_top_level(&self) -> bool {
        self.parent == ROOT
    }
}
