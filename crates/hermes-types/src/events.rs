use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events sent over the WebSocket gateway.
///
/// Every event goes to every connected session: the gateway keeps a single
/// global topic and clients filter for the conversations they care about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayEvent {
    /// A message passed the authorization gate and was persisted.
    /// Fanned out to all live sessions, the sender's included.
    ReceiveMessage {
        id: Uuid,
        sender: String,
        receiver: String,
        content: String,
        created_at: chrono::DateTime<chrono::Utc>,
    },

    /// A `SendMessage` command from this session was rejected.
    /// Delivered only to the emitting session, never broadcast.
    SendRejected { reason: String },
}

/// Commands sent FROM client TO server over WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayCommand {
    /// Send a message. Routed through the same authorization/persistence
    /// path as `POST /message` before any broadcast happens.
    SendMessage {
        sender: String,
        receiver: String,
        content: String,
    },
}
