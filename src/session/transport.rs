//! Realtime Transport
//!
//! The [`Transport`] and [`Connector`] traits isolate the session manager
//! from the concrete WebSocket stack so the connection lifecycle can be
//! driven by scripted transports in tests. [`WsConnector`] is the production
//! implementation: it dials the broker's `/wss` sub-path with the bearer
//! credential attached to the handshake request.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, http::HeaderValue, Message},
    MaybeTlsStream, WebSocketStream,
};

use super::SessionError;
use crate::rooms::RoomId;

/// A live, bidirectional text-frame transport
#[async_trait]
pub trait Transport: Send {
    /// Send one text frame
    async fn send(&mut self, message: String) -> Result<(), SessionError>;

    /// Receive the next text frame. `None` means the transport closed.
    async fn recv(&mut self) -> Option<Result<String, SessionError>>;

    /// Close the transport (best-effort)
    async fn close(&mut self) -> Result<(), SessionError>;
}

/// Factory for transports, one per dial attempt
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Dial the broker for the given room with the given credential.
    ///
    /// Returning `Ok` means the handshake completed.
    async fn connect(
        &self,
        room_id: RoomId,
        credential: &str,
    ) -> Result<Box<dyn Transport>, SessionError>;
}

/// Production connector backed by tokio-tungstenite
pub struct WsConnector {
    base_url: String,
}

impl WsConnector {
    /// Create a connector against the realtime base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn endpoint_url(&self, room_id: RoomId) -> String {
        format!("{}/wss?room={}", self.base_url.trim_end_matches('/'), room_id)
    }

    fn build_request(
        &self,
        room_id: RoomId,
        credential: &str,
    ) -> Result<tokio_tungstenite::tungstenite::handshake::client::Request, SessionError> {
        let mut request = self
            .endpoint_url(room_id)
            .into_client_request()
            .map_err(|e| SessionError::Handshake(e.to_string()))?;

        let value = HeaderValue::from_str(&format!("Bearer {}", credential))
            .map_err(|e| SessionError::Handshake(e.to_string()))?;
        request.headers_mut().insert("Authorization", value);

        Ok(request)
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(
        &self,
        room_id: RoomId,
        credential: &str,
    ) -> Result<Box<dyn Transport>, SessionError> {
        let request = self.build_request(room_id, credential)?;

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|e| SessionError::Handshake(e.to_string()))?;

        tracing::debug!(room_id, "Realtime handshake complete");
        Ok(Box::new(WsTransport { inner: stream }))
    }
}

/// Transport over an established WebSocket stream
struct WsTransport {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, message: String) -> Result<(), SessionError> {
        self.inner
            .send(Message::Text(message))
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, SessionError>> {
        loop {
            match self.inner.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Close(_)) => return None,
                // Control and binary frames carry no broker frames
                Ok(_) => continue,
                Err(e) => return Some(Err(SessionError::Transport(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.inner
            .close(None)
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))
    }
}
