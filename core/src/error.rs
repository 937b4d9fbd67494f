//! The closed error taxonomy (C11) that crosses the orchestrator → session
//! boundary as a `stream.error` event.
//!
//! Per-crate errors (parse, llm, session, store) are narrower and
//! crate-local; each exposes a conversion into [`ErrorKind`] at the point
//! it reaches the orchestrator, rather than this crate depending on every
//! other crate's error type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a provider (LLM streaming) call failed.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum ProviderErrorKind {
    /// The provider could not be reached (network/connect failure).
    #[error("provider unreachable: {0}")]
    Unreachable(String),

    /// The provider responded with a rate-limit signal.
    #[error("provider rate limited: {0}")]
    RateLimited(String),

    /// The request was rejected as invalid by the provider.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other provider-side failure.
    #[error("provider error: {0}")]
    Other(String),
}

/// The closed set of terminal/per-op error kinds a turn can produce.
///
/// Retry semantics (spec §7): `Provider::Unreachable` and
/// `Provider::RateLimited` are retried up to one attempt with a 1s
/// backoff; every other kind is terminal for the turn.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum ErrorKind {
    /// A provider-side failure. See [`ProviderErrorKind`] for the reason.
    #[error("provider: {0}")]
    Provider(ProviderErrorKind),

    /// The per-tier wall-clock budget was exceeded. Accepted operations
    /// from the tier are preserved; no retry.
    #[error("stream timeout after {tier_ms}ms")]
    StreamTimeout {
        /// The wall-clock budget, in milliseconds, that was exceeded.
        tier_ms: u64,
    },

    /// Three consecutive malformed lines from the splitter. Escalates if
    /// the tier was fast; terminal otherwise.
    #[error("three consecutive unparseable lines")]
    StreamParseFailureStreak,

    /// The client requested cancellation. Not an error in the ordinary
    /// sense — surfaced as `stream.interrupted`, never `stream.error`.
    #[error("stream cancelled by client")]
    StreamCancelled,

    /// The store collaborator is unavailable. Terminal for the turn;
    /// accepted operations are retained in memory so the client can
    /// resend.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// An invariant inside the orchestrator was violated. Terminal;
    /// always logged with full context.
    #[error("internal bug: {0}")]
    InternalBug(String),
}

impl ErrorKind {
    /// Whether the orchestrator should retry (once, with backoff) before
    /// treating this as terminal for the turn.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Provider(ProviderErrorKind::Unreachable(_))
                | ErrorKind::Provider(ProviderErrorKind::RateLimited(_))
        )
    }

    /// A short machine-readable tag for telemetry and wire events, e.g.
    /// `"Provider.RateLimited"` or `"Stream.Timeout"`.
    pub fn tag(&self) -> &'static str {
        match self {
            ErrorKind::Provider(ProviderErrorKind::Unreachable(_)) => "Provider.Unreachable",
            ErrorKind::Provider(ProviderErrorKind::RateLimited(_)) => "Provider.RateLimited",
            ErrorKind::Provider(ProviderErrorKind::InvalidRequest(_)) => "Provider.InvalidRequest",
            ErrorKind::Provider(ProviderErrorKind::Other(_)) => "Provider.Other",
            ErrorKind::StreamTimeout { .. } => "Stream.Timeout",
            ErrorKind::StreamParseFailureStreak => "Stream.ParseFailureStreak",
            ErrorKind::StreamCancelled => "Stream.Cancelled",
            ErrorKind::StoreUnavailable(_) => "Store.Unavailable",
            ErrorKind::InternalBug(_) => "Internal.Bug",
        }
    }
}
