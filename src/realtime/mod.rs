//! Realtime transport: the connection set, the wire protocol, the heartbeat
//! scheduler, and the WebSocket endpoint.

mod connections;
mod messages;
mod scheduler;
mod ws;

pub use connections::{ConnectionId, ConnectionSet};
pub use messages::{ClientMessage, ServerMessage};
pub use scheduler::HeartbeatScheduler;
pub use ws::{ws_handler, RealtimeState};
