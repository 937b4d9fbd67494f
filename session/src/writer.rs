//! The WebSocket-backed [`DeltaSink`] implementation and the session's
//! socket loop.
//!
//! Grounded on the retrieval pack's WebSocket gateway handler (a
//! `.split()` socket, a dedicated writer task fed by a bounded `mpsc`
//! channel so every outbound send is serialized, and a reader loop
//! dispatching inbound JSON by a `kind` tag) — the same shape, narrowed
//! to this protocol's four inbound message kinds and re-targeted at
//! [`OutboundEvent`] instead of that gateway's node protocol.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::events::{InboundMessage, OutboundEvent};
use crate::handler::SessionHandler;
use crate::sink::DeltaSink;

/// Outbound channel capacity between the orchestrator's turn task and
/// the socket writer task.
pub const DEFAULT_WRITER_CHANNEL_CAPACITY: usize = 64;

/// A [`DeltaSink`] backed by a single serialized writer task over a real
/// WebSocket connection. Cloning is cheap (an `Arc`-free `mpsc::Sender`
/// clone) and safe to hand to multiple callers — the channel guarantees
/// per-session send order regardless of how many clones exist.
#[derive(Clone)]
pub struct SessionWriter {
    sender: mpsc::Sender<OutboundEvent>,
}

impl SessionWriter {
    /// Spawn the writer task over `ws_sink` and return the handle plus
    /// its `JoinHandle` (ends when the channel closes or a send fails).
    pub fn spawn(
        mut ws_sink: SplitSink<WebSocket, Message>,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel(capacity);
        let handle = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                let json = event.to_wire_json();
                let text = match serde_json::to_string(&json) {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::warn!(target: "session", error = %err, "failed to serialize outbound event");
                        continue;
                    }
                };
                if ws_sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        });
        (Self { sender }, handle)
    }
}

#[async_trait]
impl DeltaSink for SessionWriter {
    async fn send(&self, event: OutboundEvent) {
        if self.sender.send(event).await.is_err() {
            tracing::warn!(target: "session", "dropped outbound event: writer closed");
        }
    }
}

/// Drive the inbound half of the connection: decode each text frame as
/// an [`InboundMessage`] and dispatch it to `handler`, in arrival order.
/// Returns when the client closes the connection or the stream ends.
pub async fn run_inbound_loop(
    mut ws_stream: SplitStream<WebSocket>,
    handler: Arc<dyn SessionHandler>,
) {
    while let Some(frame) = ws_stream.next().await {
        let msg = match frame {
            Ok(msg) => msg,
            Err(err) => {
                tracing::debug!(target: "session", error = %err, "websocket read error");
                break;
            }
        };
        match msg {
            Message::Text(text) => match serde_json::from_str::<InboundMessage>(&text) {
                Ok(InboundMessage::Message { content, message_id }) => {
                    handler.on_message(content, message_id).await
                }
                Ok(InboundMessage::DirectEdit { op }) => handler.on_direct_edit(op).await,
                Ok(InboundMessage::Interrupt {}) => handler.on_interrupt().await,
                Ok(InboundMessage::SetProfile { profile }) => {
                    handler.on_set_profile(profile).await
                }
                Err(err) => {
                    tracing::debug!(target: "session", error = %err, "ignoring unparseable inbound message")
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }
}
