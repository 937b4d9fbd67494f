//! # aide-core — shared ids, durations, error taxonomy, config, and the
//! store collaborator trait for the streaming orchestration kernel.
//!
//! This crate is the one every other crate in the workspace depends on.
//! It carries nothing domain-specific about entities or reducers (that
//! lives in `aide-snapshot` / `aide-reducer`) — just the cross-cutting
//! plumbing spec §3 (typed ids), §4.9 (duration wire format), §6.5
//! (configuration surface), §6.3 (store collaborator trait), and §7
//! (closed error taxonomy) describe.
//!
//! ## Layout
//!
//! | Module | Spec section | What it is |
//! |--------|-------------|------------|
//! | [`id`] | §3, glossary | `AideId`, `UserId`, `SessionId`, `TurnId` |
//! | [`duration`] | §4.9 | `DurationMs`, stable millisecond wire type |
//! | [`error`] | §7 | `ErrorKind`, the closed C11 taxonomy |
//! | [`config`] | §6.5 | `OrchestratorConfig`, passed in at construction |
//! | [`store`] | §6.3 | `SnapshotStore`, the external store collaborator |
//!
//! No singletons, no process-wide constants (spec §9): configuration is
//! always an explicit value passed into whatever needs it.

#![deny(missing_docs)]

pub mod config;
pub mod duration;
pub mod error;
pub mod id;
pub mod store;

pub use config::{OrchestratorConfig, TierPricing};
pub use duration::DurationMs;
pub use error::{ErrorKind, ProviderErrorKind};
pub use id::{AideId, SessionId, TurnId, UserId};
pub use store::{ConversationTailEntry, SnapshotStore, StoreError};
