#![deny(missing_docs)]
//! # aide — umbrella crate
//!
//! Single import surface for the living-page streaming orchestration
//! kernel. Re-exports each member crate behind a matching feature flag,
//! plus a `prelude` for the happy path: build an `OrchestratorConfig`,
//! a `SnapshotStore`, an `LlmClient`, and a `DeltaSink`, then construct
//! an `Orchestrator` and hand it to `aide_session::accept`.

#[cfg(feature = "core")]
pub use aide_core;
#[cfg(feature = "classify")]
pub use aide_classify;
#[cfg(feature = "llm")]
pub use aide_llm;
#[cfg(feature = "llm-mock")]
pub use aide_llm_mock;
#[cfg(feature = "orchestrator")]
pub use aide_orchestrator;
#[cfg(feature = "parse")]
pub use aide_parse;
#[cfg(feature = "prompt")]
pub use aide_prompt;
#[cfg(feature = "core")]
pub use aide_reducer;
#[cfg(feature = "session")]
pub use aide_session;
#[cfg(feature = "core")]
pub use aide_snapshot;
#[cfg(feature = "store-memory")]
pub use aide_store_memory;
#[cfg(feature = "telemetry")]
pub use aide_telemetry;

/// Happy-path imports for wiring up an aide session.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use aide_core::store::{ConversationTailEntry, SnapshotStore, StoreError};
    #[cfg(feature = "core")]
    pub use aide_core::{AideId, ErrorKind, OrchestratorConfig, SessionId, TierPricing, TurnId, UserId};

    #[cfg(feature = "core")]
    pub use aide_snapshot::{Display, Entity, EntityId, Snapshot, ROOT};

    #[cfg(feature = "core")]
    pub use aide_reducer::{reduce, Operation, Outcome, RejectionReason, Signal};

    #[cfg(feature = "classify")]
    pub use aide_classify::{classify, Classification, Tier};

    #[cfg(feature = "llm")]
    pub use aide_llm::{LlmClient, LlmEvent, StreamRequest, TokenUsage};

    #[cfg(feature = "llm-mock")]
    pub use aide_llm_mock::{MockLlmClient, PacingControl, PacingProfile};

    #[cfg(feature = "telemetry")]
    pub use aide_telemetry::{
        ChannelTelemetryRecorder, InMemorySink, TelemetryRecord, TelemetryRecorder, TelemetrySink,
        TracingSink,
    };

    #[cfg(feature = "orchestrator")]
    pub use aide_orchestrator::{EscalateTarget, Orchestrator, TurnOutcome, TurnTerminal};

    #[cfg(feature = "session")]
    pub use aide_session::{
        accept, BatchingSink, Delta, DeltaSink, InboundMessage, OutboundEvent, RecordingSink,
        SessionHandler, SessionIdentity,
    };

    #[cfg(feature = "store-memory")]
    pub use aide_store_memory::MemoryStore;
}
