//! Telemetry sinks: where drained records ultimately go.
//!
//! Grounded on `layer0/src/test_utils/logging_hook.rs`'s
//! `LoggingHook` shape (an in-memory `Mutex<Vec<_>>` recorder used by
//! tests) for [`InMemorySink`], and on the provider adapters'
//! `tracing`-based logging for [`TracingSink`], the default production
//! wiring — durable telemetry storage is out of scope for this kernel.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::record::TelemetryRecord;

/// Where a [`crate::ChannelTelemetryRecorder`] drains records to.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Persist (or emit) one record. Errors are the sink's own problem to
    /// log; this trait has no error return because a telemetry sink
    /// failure must never propagate back into the hot path.
    async fn write(&self, record: TelemetryRecord);
}

/// Logs every record via `tracing` under the `telemetry` target. The
/// default production sink.
#[derive(Debug, Default)]
pub struct TracingSink;

#[async_trait]
impl TelemetrySink for TracingSink {
    async fn write(&self, record: TelemetryRecord) {
        match &record {
            TelemetryRecord::Turn(turn) => tracing::info!(
                target: "telemetry",
                turn_id = %turn.turn_id,
                aide_id = %turn.aide_id,
                tier_trace = ?turn.tier_trace,
                ttc_ms = turn.ttc_ms,
                operations_accepted = turn.operations_accepted,
                cost_usd = %turn.cost_usd,
                "turn complete"
            ),
            TelemetryRecord::DirectEdit(edit) => tracing::info!(
                target: "telemetry",
                aide_id = %edit.aide_id,
                edit_latency_ms = edit.edit_latency_ms,
                accepted = edit.accepted,
                "direct edit"
            ),
        }
    }
}

/// Records every record in memory, in arrival order. For tests.
#[derive(Debug, Default)]
pub struct InMemorySink {
    records: Mutex<Vec<TelemetryRecord>>,
}

impl InMemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every record written so far, in arrival order.
    pub fn records(&self) -> Vec<TelemetryRecord> {
        self.records.lock().expect("telemetry sink mutex poisoned").clone()
    }
}

#[async_trait]
impl TelemetrySink for InMemorySink {
    async fn write(&self, record: TelemetryRecord) {
        self.records.lock().expect("telemetry sink mutex poisoned").push(record);
    }
}
