//! Realtime Frame Types
//!
//! Defines all frame types exchanged with the realtime broker over the
//! WebSocket transport.

use serde::{Deserialize, Serialize};

use crate::rooms::RoomId;

/// Frames sent from client to broker
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// A chat message for the current room
    Chat {
        /// Message body
        body: String,
    },
    /// Ping for keepalive
    Ping,
}

/// Frames sent from broker to client
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Broker acknowledged the handshake
    Connected {
        /// Broker-assigned session identifier
        session_id: String,
    },
    /// A chat message from a room member
    Chat {
        room_id: RoomId,
        sender: String,
        body: String,
        /// Timestamp in milliseconds
        sent_at: i64,
    },
    /// Room membership changed
    Presence {
        room_id: RoomId,
        #[serde(default)]
        joined: Vec<String>,
        #[serde(default)]
        left: Vec<String>,
    },
    /// Pong response to ping
    Pong,
    /// Broker-level protocol error
    Error {
        /// Error description
        message: String,
    },
}
