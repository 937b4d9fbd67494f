//! The inbound message handler an embedder (the orchestrator) provides.

use async_trait::async_trait;

use aide_reducer::Operation;

/// Callbacks for each inbound message kind (spec §6.1). Implemented by
/// the orchestrator; this crate only knows how to decode the wire
/// message and dispatch to these methods in arrival order.
#[async_trait]
pub trait SessionHandler: Send + Sync {
    /// A user utterance: start (or queue, if a turn is in flight — spec
    /// §5: "turns are serialized") a new turn.
    async fn on_message(&self, content: String, message_id: String);

    /// A reducer-ready update applied outside any LLM turn.
    async fn on_direct_edit(&self, op: Operation);

    /// Cancel the active turn.
    async fn on_interrupt(&self);

    /// Test-only: select the mock LLM's pacing profile.
    async fn on_set_profile(&self, profile: String);
}
