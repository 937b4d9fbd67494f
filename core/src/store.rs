//! The external snapshot store collaborator interface (spec §6.3).
//!
//! A durable store is an explicit non-goal of this kernel; this trait is
//! the narrow, domain-specific surface the orchestrator needs. The only
//! implementation this repository ships is `aide-store-memory`'s
//! in-memory test double.

use async_trait::async_trait;
use thiserror::Error;

use aide_reducer::Operation;
use aide_snapshot::Snapshot;

use crate::id::AideId;

/// A single entry in the bounded conversation tail (spec §6.3: user
/// utterances and compact summaries of prior assistant turns).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ConversationTailEntry {
    /// A verbatim prior user utterance.
    User {
        /// The message text.
        text: String,
    },
    /// A compact summary of a prior assistant (mutation) turn, per spec
    /// §4.4: `"N operations applied"` rather than the raw operations.
    AssistantSummary {
        /// The summary text.
        summary: String,
    },
}

/// Failures from the store collaborator. Every variant maps to
/// [`crate::error::ErrorKind::StoreUnavailable`] at the orchestrator
/// boundary.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The aide was not found.
    #[error("aide not found: {0}")]
    NotFound(String),

    /// The underlying storage is unavailable.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// The three operations the orchestrator requires from the store
/// collaborator (spec §6.3). Each call is atomic from the orchestrator's
/// point of view.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the current snapshot and bounded conversation tail for an
    /// aide.
    async fn load_turn_context(
        &self,
        aide_id: &AideId,
    ) -> Result<(Snapshot, Vec<ConversationTailEntry>), StoreError>;

    /// Append a completed turn: the triggering user message, its
    /// accepted operations (raw, as they were produced, abbreviations
    /// already expanded), and the resulting final snapshot. The user
    /// message and a summary of the operations both join the
    /// conversation tail future calls to `load_turn_context` will see.
    async fn append_turn(
        &self,
        aide_id: &AideId,
        turn_id: &str,
        user_message: &str,
        operations: &[Operation],
        final_snapshot: &Snapshot,
    ) -> Result<(), StoreError>;

    /// Append a single direct edit (an `entity.update` applied outside
    /// any turn) and the resulting snapshot.
    async fn append_direct_edit(
        &self,
        aide_id: &AideId,
        op: &Operation,
        result_snapshot: &Snapshot,
    ) -> Result<(), StoreError>;
}
