//! The recorder abstraction (spec §4.9): "telemetry writes must not
//! block the hot path ... fire-and-forget, but MUST NOT be dropped on
//! normal completion."
//!
//! [`ChannelTelemetryRecorder`] draws the line the orchestrator needs at
//! exactly two call sites: `record_final` (the one per-turn or
//! per-direct-edit record — awaits the bounded channel so backpressure,
//! not drop, is the failure mode) and `record_progress` (anything
//! sub-turn and best-effort — `try_send`, dropping and logging a warning
//! under backpressure). See `DESIGN.md` for why the line is drawn here.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::record::TelemetryRecord;
use crate::sink::TelemetrySink;

/// Object-safe recorder the orchestrator holds as `Arc<dyn
/// TelemetryRecorder>`.
#[async_trait]
pub trait TelemetryRecorder: Send + Sync {
    /// Record the turn's single terminal record, or a direct edit's
    /// record. Must not be dropped: backs off by awaiting channel
    /// capacity rather than discarding.
    async fn record_final(&self, record: TelemetryRecord);

    /// Record a sub-turn progress event. Best-effort: dropped (with a
    /// logged warning) if the channel is full.
    fn record_progress(&self, record: TelemetryRecord);
}

/// A bounded `mpsc` channel plus a background task draining it into a
/// [`TelemetrySink`].
pub struct ChannelTelemetryRecorder {
    sender: mpsc::Sender<TelemetryRecord>,
}

impl ChannelTelemetryRecorder {
    /// Spawn the background drain task and return the recorder handle
    /// plus its `JoinHandle` (callers that want a graceful shutdown can
    /// drop the recorder, which closes the channel, then await the
    /// handle to know the sink has seen every in-flight record).
    pub fn spawn(sink: Arc<dyn TelemetrySink>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel(capacity);
        let handle = tokio::spawn(async move {
            while let Some(record) = receiver.recv().await {
                sink.write(record).await;
            }
        });
        (Self { sender }, handle)
    }
}

#[async_trait]
impl TelemetryRecorder for ChannelTelemetryRecorder {
    async fn record_final(&self, record: TelemetryRecord) {
        if self.sender.send(record).await.is_err() {
            tracing::warn!(target: "telemetry", "telemetry channel closed; final record lost");
        }
    }

    fn record_progress(&self, record: TelemetryRecord) {
        if let Err(err) = self.sender.try_send(record) {
            tracing::warn!(
                target: "telemetry",
                error = %err,
                "dropped telemetry progress record under backpressure"
            );
        }
    }
}
