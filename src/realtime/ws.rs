//! WebSocket endpoint for realtime clients.
//!
//! Handles the HTTP → WebSocket upgrade and the connection lifecycle: join
//! the connection set, forward every broadcast to the client as a JSON text
//! frame, accept inbound `doAction` events (logged, not dispatched), and
//! leave the set on close or error. Malformed payloads are logged and the
//! connection stays open.

use std::net::SocketAddr;
use std::ops::ControlFlow;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use super::connections::ConnectionSet;
use super::messages::ClientMessage;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct RealtimeState {
    pub connections: Arc<ConnectionSet>,
}

impl RealtimeState {
    pub fn new(connections: Arc<ConnectionSet>) -> Self {
        Self { connections }
    }
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /pc/live`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<RealtimeState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, peer.to_string(), state))
}

/// Runs for the lifetime of one established connection.
async fn handle_socket(socket: WebSocket, peer: String, state: RealtimeState) {
    let (mut sender, mut receiver) = socket.split();

    let (id, mut rx) = state.connections.join(peer.clone()).await;
    info!(%peer, connection = %id, "client connected");

    // Forward broadcasts to the client.
    let peer_send = peer.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match serde_json::to_string(&message) {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        debug!(peer = %peer_send, "send error, closing connection");
                        break;
                    }
                }
                Err(error) => {
                    warn!(peer = %peer_send, %error, "failed to encode outbound message");
                }
            }
        }
    });

    // Consume inbound events.
    let peer_recv = peer.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(frame) => {
                    if handle_frame(&peer_recv, frame).is_break() {
                        break;
                    }
                }
                Err(error) => {
                    debug!(peer = %peer_recv, %error, "receive error");
                    break;
                }
            }
        }
    });

    // Whichever side ends first tears the other down.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.connections.leave(&id).await;
    info!(%peer, connection = %id, "client disconnected");
}

/// Processes one inbound frame; `Break` ends the receive loop.
///
/// Malformed text never breaks: the client stays connected and keeps
/// receiving heartbeats.
fn handle_frame(peer: &str, frame: Message) -> ControlFlow<()> {
    match frame {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::DoAction(action)) => {
                    // Accepted and logged only; dispatch is not handled
                    // by the transport.
                    info!(%peer, %action, "perform action");
                }
                Err(error) => {
                    warn!(%peer, %error, "unexpected realtime payload");
                }
            }
            ControlFlow::Continue(())
        }
        Message::Close(_) => {
            debug!(%peer, "client sent close frame");
            ControlFlow::Break(())
        }
        // Protocol ping/pong and binary frames are ignored.
        _ => ControlFlow::Continue(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_text_keeps_the_connection_open() {
        let outcome = handle_frame("peer", Message::Text("not json".to_string()));
        assert_eq!(outcome, ControlFlow::Continue(()));

        let wrong_event =
            Message::Text(r#"{"event":"unknown","data":null}"#.to_string());
        assert_eq!(handle_frame("peer", wrong_event), ControlFlow::Continue(()));
    }

    #[test]
    fn do_action_keeps_the_connection_open() {
        let frame =
            Message::Text(r#"{"event":"doAction","data":{"name":"Restart"}}"#.to_string());
        assert_eq!(handle_frame("peer", frame), ControlFlow::Continue(()));
    }

    #[test]
    fn close_frame_ends_the_receive_loop() {
        assert_eq!(handle_frame("peer", Message::Close(None)), ControlFlow::Break(()));
    }

    #[test]
    fn ping_frames_are_ignored() {
        let outcome = handle_frame("peer", Message::Ping(Vec::new()));
        assert_eq!(outcome, ControlFlow::Continue(()));
    }
}
