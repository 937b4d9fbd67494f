//! Per-client WebSocket session (C8): wire event/message shapes, the
//! batching decorator, the inbound handler contract, and the concrete
//! socket plumbing that ties them together.
//!
//! The orchestrator owns turn logic and implements [`SessionHandler`];
//! this crate owns everything downstream of "bytes on a socket."

pub mod events;
pub mod handler;
pub mod sink;
pub mod writer;

pub use events::{Delta, InboundMessage, OutboundEvent};
pub use handler::SessionHandler;
pub use sink::{BatchingSink, DeltaSink, RecordingSink, DEFAULT_BATCH_FLUSH_TIMEOUT_MS};
pub use writer::{run_inbound_loop, SessionWriter, DEFAULT_WRITER_CHANNEL_CAPACITY};

use std::sync::Arc;

use aide_core::{AideId, UserId};
use axum::extract::ws::WebSocket;
use futures_util::StreamExt;
use tokio::task::JoinHandle;

/// Identifies which aide and user a socket belongs to. Extracted from
/// the upgrade request (path/query/auth) before [`accept`] is called;
/// this crate has no opinion on how that extraction happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    /// The living page this session is attached to.
    pub aide_id: AideId,
    /// The authenticated user driving this session.
    pub user_id: UserId,
}

impl SessionIdentity {
    /// Pair an aide and user into a session identity.
    pub fn new(aide_id: AideId, user_id: UserId) -> Self {
        Self { aide_id, user_id }
    }
}

/// Split `socket` into its writer and reader halves and spawn both: the
/// serialized outbound writer (wrapped in [`BatchingSink`]) and the
/// inbound dispatch loop feeding `handler`. Returns once both halves
/// have been handed off to Tokio; the caller typically awaits the
/// returned reader-loop handle to know when the connection closed (the
/// writer stops on its own once the sink is dropped or the socket
/// errors).
pub fn accept(
    socket: WebSocket,
    handler: Arc<dyn SessionHandler>,
) -> (Arc<BatchingSink<SessionWriter>>, JoinHandle<()>) {
    let (ws_sink, ws_stream) = socket.split();
    let (writer, _writer_task) = SessionWriter::spawn(ws_sink, DEFAULT_WRITER_CHANNEL_CAPACITY);
    let batching = Arc::new(BatchingSink::new(Arc::new(writer)));
    let reader_task = tokio::spawn(run_inbound_loop(ws_stream, handler));
    (batching, reader_task)
}
