//! Realtime wire protocol.
//!
//! JSON text frames shaped `{"event": ..., "data": ...}`:
//! - Server → client: `heartbeat`, carrying the aggregated sample.
//! - Client → server: `doAction`, carrying an action payload that is logged
//!   but not dispatched here.

use serde::{Deserialize, Serialize};

use crate::domain::HeartbeatSample;

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// One tick's aggregated telemetry sample, `time` included.
    Heartbeat(HeartbeatSample),
}

/// Messages received from clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// An action the client asks the host to perform.
    DoAction(serde_json::Value),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn heartbeat_serializes_with_event_and_data() {
        let mut beat = HeartbeatSample::new();
        beat.set("cpu", json!({"usagePercent": 0.5}));
        beat.stamp(123);

        let json = serde_json::to_value(ServerMessage::Heartbeat(beat)).unwrap();
        assert_eq!(
            json,
            json!({
                "event": "heartbeat",
                "data": {"cpu": {"usagePercent": 0.5}, "time": 123}
            })
        );
    }

    #[test]
    fn do_action_deserializes_payload() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"event": "doAction", "data": {"name": "Restart"}}"#).unwrap();
        let ClientMessage::DoAction(payload) = msg;
        assert_eq!(payload, json!({"name": "Restart"}));
    }

    #[test]
    fn unknown_event_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"event": "nope", "data": 1}"#).is_err());
    }
}
