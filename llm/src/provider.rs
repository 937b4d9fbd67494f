//! The streaming LLM client trait (C6, spec §4.6, §6.4).
//!
//! Object-safe (unlike `neuron_turn::Provider`'s RPITIT-based, non-
//! object-safe shape) because the orchestrator holds its stream behind
//! `Arc<dyn LlmClient>`, set once at construction time — it needs a
//! `Box<dyn LlmClient>`, not a generic parameter.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::types::{LlmEvent, StreamRequest};

/// A boxed, owned stream of [`LlmEvent`]s. Dropping it cancels the
/// underlying call (spec §4.6: "Cancellation: closing the sequence
/// aborts the underlying call").
pub type BoxLlmStream = Pin<Box<dyn Stream<Item = LlmEvent> + Send>>;

/// Abstract streaming provider contract (spec §4.6): `stream(...) ->
/// AsyncSequence<LLMEvent>`. Never returns an upfront `Result` — any
/// failure to establish or continue the call surfaces as an
/// [`LlmEvent::ProviderError`] item within the stream, so callers have
/// one code path for "the call never really started" and "the call
/// died mid-stream".
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Open a streaming call and return its event sequence.
    async fn stream(&self, request: StreamRequest) -> BoxLlmStream;
}
