//! The delta fan-out sink (spec §4.8) and its batching decorator.
//!
//! [`RecordingSink`] is grounded on `layer0/src/test_utils/
//! logging_hook.rs`'s `LoggingHook`: an in-memory `Mutex<Vec<_>>`
//! recorder used by tests that don't need a real socket. The production
//! implementation (a WebSocket-backed writer) lives in
//! [`crate::writer::SessionWriter`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::events::{Delta, OutboundEvent};

/// Safety flush for an unclosed batch (spec §4.8, §6.5 default).
pub const DEFAULT_BATCH_FLUSH_TIMEOUT_MS: u64 = 30_000;

/// The orchestrator's view of the fan-out layer: one event at a time,
/// in the order the orchestrator wants them delivered. Implementations
/// must serialize sends (spec: "the session owns a single serialized
/// writer").
#[async_trait]
pub trait DeltaSink: Send + Sync {
    /// Send one outbound event.
    async fn send(&self, event: OutboundEvent);
}

/// Records every event in memory, in arrival order. For orchestrator
/// tests that don't need a real socket.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<OutboundEvent>>,
}

impl RecordingSink {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every event recorded so far, in arrival order.
    pub async fn events(&self) -> Vec<OutboundEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl DeltaSink for RecordingSink {
    async fn send(&self, event: OutboundEvent) {
        self.events.lock().await.push(event);
    }
}

struct OpenBatch {
    buffered: Vec<Delta>,
    flush_timer: JoinHandle<()>,
}

/// Wraps any [`DeltaSink`] with `batch.start`/`batch.end` buffering
/// semantics (spec §4.8): deltas sent while a batch is open are buffered
/// rather than forwarded; `end_batch` flushes them as one
/// [`OutboundEvent::DeltaBatch`]. A safety timer forces the flush if
/// `end_batch` never arrives.
pub struct BatchingSink<S: DeltaSink + 'static> {
    inner: Arc<S>,
    open: Arc<Mutex<Option<OpenBatch>>>,
    flush_timeout_ms: u64,
}

impl<S: DeltaSink + 'static> BatchingSink<S> {
    /// Wrap `inner` with the default 30-second safety flush.
    pub fn new(inner: Arc<S>) -> Self {
        Self::with_flush_timeout(inner, DEFAULT_BATCH_FLUSH_TIMEOUT_MS)
    }

    /// Wrap `inner` with a custom safety-flush timeout (for tests).
    pub fn with_flush_timeout(inner: Arc<S>, flush_timeout_ms: u64) -> Self {
        Self { inner, open: Arc::new(Mutex::new(None)), flush_timeout_ms }
    }

    /// Begin buffering deltas. If a batch was already open, it is
    /// flushed first (defensive — the orchestrator is expected to pair
    /// `batch.start`/`batch.end`, but this keeps the sink total).
    pub async fn start_batch(&self) {
        self.flush_open_batch().await;
        let inner = self.inner.clone();
        let open = self.open.clone();
        let timeout_ms = self.flush_timeout_ms;
        let flush_timer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(timeout_ms)).await;
            let mut guard = open.lock().await;
            if let Some(batch) = guard.take() {
                if !batch.buffered.is_empty() {
                    inner.send(OutboundEvent::DeltaBatch(batch.buffered)).await;
                }
            }
        });
        let mut guard = self.open.lock().await;
        *guard = Some(OpenBatch { buffered: Vec::new(), flush_timer });
    }

    /// Send a delta: buffered if a batch is open, forwarded immediately
    /// otherwise.
    pub async fn send_delta(&self, delta: Delta) {
        let mut guard = self.open.lock().await;
        match guard.as_mut() {
            Some(batch) => batch.buffered.push(delta),
            None => {
                drop(guard);
                self.inner.send(OutboundEvent::Delta(delta)).await;
            }
        }
    }

    /// End the current batch, flushing whatever was buffered as one
    /// `delta.batch` event. A no-op if no batch is open.
    pub async fn end_batch(&self) {
        self.flush_open_batch().await;
    }

    /// Flush any open batch as it stands, without requiring a matching
    /// `batch.end` (spec: "If the stream ends or is interrupted inside a
    /// batch, the buffered deltas are flushed as they stand").
    pub async fn flush_open_batch(&self) {
        let batch = self.open.lock().await.take();
        if let Some(batch) = batch {
            batch.flush_timer.abort();
            if !batch.buffered.is_empty() {
                self.inner.send(OutboundEvent::DeltaBatch(batch.buffered)).await;
            }
        }
    }

    /// Whether a batch is currently open.
    pub async fn is_batching(&self) -> bool {
        self.open.lock().await.is_some()
    }

    /// Forward a non-delta event directly to the inner sink, bypassing
    /// batching (voice, clarify, stream.*, meta.* events are never
    /// buffered).
    pub async fn send_direct(&self, event: OutboundEvent) {
        self.inner.send(event).await;
    }
}
