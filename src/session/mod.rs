//! Realtime Session
//!
//! Owns the single live connection to the realtime broker endpoint, keyed
//! by (room id, credential). The [`SessionManager`] establishes, tears down,
//! and reports connectivity as those keys change; the fixed-delay reconnect
//! policy lives inside the connection's background loop.

mod manager;
mod messages;
mod transport;

pub use manager::{ConnectionHandle, SessionEvent, SessionManager, SessionState};
pub use messages::{ClientFrame, ServerFrame};
pub use transport::{Connector, Transport, WsConnector};

/// Errors from the realtime session layer
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No live connection handle exists
    #[error("No active realtime connection")]
    NotConnected,

    /// The transport failed mid-session
    #[error("Transport error: {0}")]
    Transport(String),

    /// The initial handshake was refused
    #[error("Handshake failed: {0}")]
    Handshake(String),
}
