//! Per-turn and per-direct-edit telemetry (C9, spec §4.9).

#![deny(missing_docs)]

pub mod cost;
pub mod record;
pub mod recorder;
pub mod sink;

pub use cost::compute_cost_usd;
pub use record::{DirectEditTelemetry, PassUsage, TelemetryRecord, TurnTelemetry};
pub use recorder::{ChannelTelemetryRecorder, TelemetryRecorder};
pub use sink::{InMemorySink, TelemetrySink, TracingSink};
