//! Realtime Session Manager
//!
//! Owns at most one live connection handle, keyed by (room id, credential).
//! Every key change tears the previous connection down before a new one is
//! dialed; the teardown is an explicit statement in [`SessionManager::apply`],
//! never a side effect. Automatic redial after a drop happens inside the
//! handle's background loop at a fixed delay, not in the manager.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::messages::{ClientFrame, ServerFrame};
use super::transport::{Connector, Transport};
use super::SessionError;
use crate::rooms::RoomId;

/// Capacity of the bounded event channel. When the consumer lags, events
/// other than `Disconnected` are dropped rather than blocking the loop.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// How long a teardown waits for the background loop before aborting it
const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// No inputs, no handle
    Idle = 0,
    /// Handle exists, handshake not yet complete
    Connecting = 1,
    /// Handshake complete
    Connected = 2,
    /// Handle exists but the transport dropped or errored
    Disconnected = 3,
}

impl SessionState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => SessionState::Idle,
            1 => SessionState::Connecting,
            2 => SessionState::Connected,
            _ => SessionState::Disconnected,
        }
    }
}

/// Events emitted by the connection's background loop
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Handshake completed
    Connected { handle_id: Uuid },
    /// Transport dropped (gracefully or on error); redial follows unless the
    /// session was shut down
    Disconnected { reason: Option<String> },
    /// Broker-level protocol error; connectivity flag is cleared but the
    /// transport stays up until it actually closes
    ProtocolError { message: String },
    /// A broker frame for the UI layer
    Frame(ServerFrame),
}

/// The (room, credential) pair a connection is keyed by
#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionKey {
    room_id: RoomId,
    credential: String,
}

/// State shared between a handle and its background loop
struct HandleShared {
    connected: AtomicBool,
    state: AtomicU8,
    last_error: Mutex<Option<String>>,
}

impl HandleShared {
    fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            state: AtomicU8::new(SessionState::Connecting as u8),
            last_error: Mutex::new(None),
        }
    }

    fn set_state(&self, state: SessionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_last_error(&self, message: String) {
        *self.last_error.lock().unwrap() = Some(message);
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }
}

/// The live object representing one realtime transport session.
///
/// Exclusively owned by the [`SessionManager`]; collaborators only ever see
/// a read-only reference.
pub struct ConnectionHandle {
    id: Uuid,
    key: SessionKey,
    shared: Arc<HandleShared>,
    cmd_tx: mpsc::UnboundedSender<ClientFrame>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl ConnectionHandle {
    /// Unique identifier of this handle (stable across reconnects of the
    /// same handle, new on every key change)
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Room this handle is keyed to
    pub fn room_id(&self) -> RoomId {
        self.key.room_id
    }

    /// Derived connectivity flag: true once the handshake completed,
    /// false after any drop or protocol error
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    /// Most recent transport or protocol error, for diagnostics
    pub fn last_error(&self) -> Option<String> {
        self.shared.last_error()
    }

    fn is_live(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    fn send(&self, frame: ClientFrame) -> Result<(), SessionError> {
        self.cmd_tx
            .send(frame)
            .map_err(|_| SessionError::NotConnected)
    }

    /// Stop the background loop and close the transport (best-effort)
    async fn deactivate(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(TEARDOWN_TIMEOUT, &mut task).await {
                Ok(_) => {}
                Err(_) => {
                    tracing::warn!(handle_id = %self.id, "Session loop did not exit in time; aborting");
                    task.abort();
                    let _ = task.await;
                }
            }
        }
        self.shared.connected.store(false, Ordering::Release);
        self.shared.set_state(SessionState::Idle);
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        // Drop is synchronous; aborting the task drops the loop future and
        // with it the transport.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Maintains exactly one connection lifecycle per (room id, credential) pair
pub struct SessionManager {
    connector: Arc<dyn Connector>,
    reconnect_delay: Duration,
    event_tx: mpsc::Sender<SessionEvent>,
    handle: Option<ConnectionHandle>,
}

impl SessionManager {
    /// Create a manager and the receiver its connection events arrive on
    pub fn new(
        connector: Arc<dyn Connector>,
        reconnect_delay: Duration,
    ) -> (Self, mpsc::Receiver<SessionEvent>) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        (
            Self {
                connector,
                reconnect_delay,
                event_tx,
                handle: None,
            },
            event_rx,
        )
    }

    /// Reconcile the session with the current (room id, credential) inputs.
    ///
    /// - Either input absent: close any live handle and go idle.
    /// - Both present, live handle for the same key: no-op (idempotent).
    /// - Both present otherwise: tear the old handle down, then dial.
    pub async fn apply(&mut self, room_id: Option<RoomId>, credential: Option<&str>) {
        let key = match (room_id, credential) {
            (Some(room_id), Some(credential)) => SessionKey {
                room_id,
                credential: credential.to_string(),
            },
            _ => {
                self.teardown().await;
                return;
            }
        };

        if let Some(handle) = &self.handle {
            if handle.key == key && handle.is_live() {
                tracing::debug!(
                    room_id = key.room_id,
                    handle_id = %handle.id,
                    "Session inputs unchanged; keeping live handle"
                );
                return;
            }
        }

        // The old connection must be fully gone before the new one dials.
        self.teardown().await;
        self.handle = Some(self.spawn_handle(key));
    }

    /// Read-only reference to the current handle, if any
    pub fn handle(&self) -> Option<&ConnectionHandle> {
        self.handle.as_ref()
    }

    /// Derived connectivity flag
    pub fn is_connected(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| h.is_connected())
            .unwrap_or(false)
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.handle
            .as_ref()
            .map(|h| h.shared.state())
            .unwrap_or(SessionState::Idle)
    }

    /// Most recent transport or protocol error, for diagnostics
    pub fn last_error(&self) -> Option<String> {
        self.handle.as_ref().and_then(|h| h.last_error())
    }

    /// Queue a chat frame for the current room
    pub fn send_chat(&self, body: impl Into<String>) -> Result<(), SessionError> {
        let handle = self.handle.as_ref().ok_or(SessionError::NotConnected)?;
        handle.send(ClientFrame::Chat { body: body.into() })
    }

    /// Close any live connection and go idle
    pub async fn shutdown(&mut self) {
        self.teardown().await;
    }

    async fn teardown(&mut self) {
        if let Some(handle) = self.handle.take() {
            tracing::info!(
                handle_id = %handle.id,
                room_id = handle.key.room_id,
                "Tearing down realtime session"
            );
            handle.deactivate().await;
        }
    }

    fn spawn_handle(&self, key: SessionKey) -> ConnectionHandle {
        let id = Uuid::new_v4();
        let shared = Arc::new(HandleShared::new());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tracing::info!(handle_id = %id, room_id = key.room_id, "Opening realtime session");

        let task = tokio::spawn(session_loop(
            Arc::clone(&self.connector),
            key.clone(),
            Arc::clone(&shared),
            cmd_rx,
            shutdown_rx,
            self.event_tx.clone(),
            id,
            self.reconnect_delay,
        ));

        ConnectionHandle {
            id,
            key,
            shared,
            cmd_tx,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Why the per-connection loop stopped
enum LoopExit {
    /// Shutdown requested or handle dropped; no redial
    Shutdown,
    /// Transport closed or failed; redial after the fixed delay
    TransportClosed(Option<String>),
}

/// Background loop for one handle: dial, pump frames, redial on drop.
#[allow(clippy::too_many_arguments)]
async fn session_loop(
    connector: Arc<dyn Connector>,
    key: SessionKey,
    shared: Arc<HandleShared>,
    mut cmd_rx: mpsc::UnboundedReceiver<ClientFrame>,
    mut shutdown_rx: oneshot::Receiver<()>,
    event_tx: mpsc::Sender<SessionEvent>,
    handle_id: Uuid,
    reconnect_delay: Duration,
) {
    loop {
        shared.set_state(SessionState::Connecting);

        let mut transport = tokio::select! {
            _ = &mut shutdown_rx => return,
            result = connector.connect(key.room_id, &key.credential) => match result {
                Ok(transport) => transport,
                Err(e) => {
                    tracing::warn!(room_id = key.room_id, error = %e, "Realtime dial failed");
                    shared.set_state(SessionState::Disconnected);
                    shared.set_last_error(e.to_string());
                    emit_disconnected(&event_tx, Some(e.to_string())).await;
                    tokio::select! {
                        _ = &mut shutdown_rx => return,
                        _ = tokio::time::sleep(reconnect_delay) => continue,
                    }
                }
            },
        };

        // Handshake complete
        shared.connected.store(true, Ordering::Release);
        shared.set_state(SessionState::Connected);
        tracing::info!(handle_id = %handle_id, room_id = key.room_id, "Realtime session connected");
        emit(&event_tx, SessionEvent::Connected { handle_id });

        let exit = run_connection(
            transport.as_mut(),
            &mut cmd_rx,
            &mut shutdown_rx,
            &shared,
            &event_tx,
        )
        .await;

        shared.connected.store(false, Ordering::Release);
        shared.set_state(SessionState::Disconnected);

        match exit {
            LoopExit::Shutdown => {
                let _ = transport.close().await;
                emit_disconnected(&event_tx, Some("session closed".into())).await;
                return;
            }
            LoopExit::TransportClosed(reason) => {
                tracing::info!(
                    handle_id = %handle_id,
                    room_id = key.room_id,
                    reason = reason.as_deref().unwrap_or("closed by broker"),
                    "Realtime session dropped"
                );
                emit_disconnected(&event_tx, reason).await;
                tokio::select! {
                    _ = &mut shutdown_rx => return,
                    _ = tokio::time::sleep(reconnect_delay) => {}
                }
            }
        }
    }
}

/// Pump one established transport until it drops or the session shuts down
async fn run_connection(
    transport: &mut dyn Transport,
    cmd_rx: &mut mpsc::UnboundedReceiver<ClientFrame>,
    shutdown_rx: &mut oneshot::Receiver<()>,
    shared: &HandleShared,
    event_tx: &mpsc::Sender<SessionEvent>,
) -> LoopExit {
    loop {
        tokio::select! {
            _ = &mut *shutdown_rx => return LoopExit::Shutdown,

            cmd = cmd_rx.recv() => match cmd {
                Some(frame) => match serde_json::to_string(&frame) {
                    Ok(json) => {
                        if let Err(e) = transport.send(json).await {
                            return LoopExit::TransportClosed(Some(format!("send error: {}", e)));
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize client frame");
                    }
                },
                // Handle dropped without an explicit shutdown
                None => return LoopExit::Shutdown,
            },

            incoming = transport.recv() => match incoming {
                Some(Ok(text)) => match serde_json::from_str::<ServerFrame>(&text) {
                    Ok(ServerFrame::Error { message }) => {
                        // Protocol error: connectivity goes false and the
                        // message is surfaced, but the transport stays up.
                        // Whether a close follows is the broker's call.
                        shared.connected.store(false, Ordering::Release);
                        shared.set_last_error(message.clone());
                        tracing::warn!(error = %message, "Broker protocol error");
                        emit(event_tx, SessionEvent::ProtocolError { message });
                    }
                    Ok(ServerFrame::Connected { session_id }) => {
                        shared.connected.store(true, Ordering::Release);
                        shared.set_state(SessionState::Connected);
                        tracing::debug!(session_id = %session_id, "Broker confirmed session");
                    }
                    Ok(frame) => emit(event_tx, SessionEvent::Frame(frame)),
                    Err(e) => {
                        tracing::warn!(error = %e, raw = %text, "Unparseable broker frame");
                    }
                },
                Some(Err(e)) => return LoopExit::TransportClosed(Some(e.to_string())),
                None => return LoopExit::TransportClosed(None),
            },
        }
    }
}

/// Forward an event; drop it (with a warning) if the consumer lags
fn emit(event_tx: &mpsc::Sender<SessionEvent>, event: SessionEvent) {
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            tracing::warn!(
                "Event channel full, dropping event: {:?}",
                std::mem::discriminant(&dropped)
            );
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::debug!("Event channel closed, receiver dropped");
        }
    }
}

/// `Disconnected` must never be dropped, so it blocks instead of trying
async fn emit_disconnected(event_tx: &mpsc::Sender<SessionEvent>, reason: Option<String>) {
    if event_tx
        .send(SessionEvent::Disconnected { reason })
        .await
        .is_err()
    {
        tracing::debug!("Event channel closed, receiver dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    /// One scripted inbound item: `None` = clean close, `Some(..)` = frame
    /// or error. An exhausted script hangs so the loop stays alive.
    type Script = Vec<Option<Result<String, SessionError>>>;

    struct MockTransport {
        incoming: VecDeque<Option<Result<String, SessionError>>>,
        sent: Arc<StdMutex<Vec<String>>>,
        log: Arc<StdMutex<Vec<String>>>,
        label: usize,
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&mut self, message: String) -> Result<(), SessionError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn recv(&mut self) -> Option<Result<String, SessionError>> {
            if let Some(item) = self.incoming.pop_front() {
                item
            } else {
                std::future::pending().await
            }
        }

        async fn close(&mut self) -> Result<(), SessionError> {
            self.log.lock().unwrap().push(format!("close#{}", self.label));
            Ok(())
        }
    }

    struct MockConnector {
        scripts: StdMutex<VecDeque<Script>>,
        sent: Arc<StdMutex<Vec<String>>>,
        log: Arc<StdMutex<Vec<String>>>,
    }

    impl MockConnector {
        fn new(scripts: Vec<Script>) -> Arc<Self> {
            Arc::new(Self {
                scripts: StdMutex::new(VecDeque::from(scripts)),
                sent: Arc::new(StdMutex::new(Vec::new())),
                log: Arc::new(StdMutex::new(Vec::new())),
            })
        }

        fn dials(&self) -> usize {
            self.log
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.starts_with("dial"))
                .count()
        }

        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Connector for MockConnector {
        async fn connect(
            &self,
            room_id: RoomId,
            _credential: &str,
        ) -> Result<Box<dyn Transport>, SessionError> {
            let mut log = self.log.lock().unwrap();
            let label = log.iter().filter(|e| e.starts_with("dial")).count() + 1;
            log.push(format!("dial#{}(room={})", label, room_id));
            drop(log);

            let incoming = self
                .scripts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default();

            Ok(Box::new(MockTransport {
                incoming: VecDeque::from(incoming),
                sent: Arc::clone(&self.sent),
                log: Arc::clone(&self.log),
                label,
            }))
        }
    }

    fn error_frame(message: &str) -> Option<Result<String, SessionError>> {
        Some(Ok(serde_json::to_string(&ServerFrame::Error {
            message: message.to_string(),
        })
        .unwrap()))
    }

    fn chat_frame(body: &str) -> Option<Result<String, SessionError>> {
        Some(Ok(serde_json::to_string(&ServerFrame::Chat {
            room_id: 7,
            sender: "maya".into(),
            body: body.to_string(),
            sent_at: 1_699_000_000_000,
        })
        .unwrap()))
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached within 1s");
    }

    #[tokio::test]
    async fn test_connects_with_valid_inputs() {
        let connector = MockConnector::new(vec![vec![]]);
        let (mut manager, _rx) = SessionManager::new(connector.clone(), Duration::from_secs(5));

        assert_eq!(manager.state(), SessionState::Idle);
        manager.apply(Some(7), Some("tok")).await;
        wait_until(|| manager.is_connected()).await;

        assert_eq!(manager.state(), SessionState::Connected);
        assert!(manager.handle().is_some());
        assert_eq!(manager.handle().unwrap().room_id(), 7);
        assert_eq!(connector.dials(), 1);

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn test_null_input_tears_down_connection() {
        let connector = MockConnector::new(vec![vec![]]);
        let (mut manager, _rx) = SessionManager::new(connector.clone(), Duration::from_secs(5));

        manager.apply(Some(7), Some("tok")).await;
        wait_until(|| manager.is_connected()).await;

        // Credential goes away: connection must not survive
        manager.apply(Some(7), None).await;
        assert!(!manager.is_connected());
        assert!(manager.handle().is_none());
        assert_eq!(manager.state(), SessionState::Idle);
        assert_eq!(connector.log().last().unwrap(), "close#1");
    }

    #[tokio::test]
    async fn test_same_key_is_idempotent() {
        let connector = MockConnector::new(vec![vec![]]);
        let (mut manager, _rx) = SessionManager::new(connector.clone(), Duration::from_secs(5));

        manager.apply(Some(7), Some("tok")).await;
        wait_until(|| manager.is_connected()).await;
        let first_id = manager.handle().unwrap().id();

        // Redundant trigger with identical inputs: same handle, no redial
        manager.apply(Some(7), Some("tok")).await;
        assert_eq!(manager.handle().unwrap().id(), first_id);
        assert_eq!(connector.dials(), 1);

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn test_key_change_closes_old_before_dialing_new() {
        let connector = MockConnector::new(vec![vec![], vec![]]);
        let (mut manager, _rx) = SessionManager::new(connector.clone(), Duration::from_secs(5));

        manager.apply(Some(7), Some("tok")).await;
        wait_until(|| manager.is_connected()).await;
        let first_id = manager.handle().unwrap().id();

        manager.apply(Some(8), Some("tok")).await;
        wait_until(|| manager.is_connected()).await;
        assert_ne!(manager.handle().unwrap().id(), first_id);

        // Old transport closed strictly before the new dial
        let log = connector.log();
        assert_eq!(log[0], "dial#1(room=7)");
        assert_eq!(log[1], "close#1");
        assert_eq!(log[2], "dial#2(room=8)");

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn test_drop_clears_flag_and_redials_after_delay() {
        // First transport closes immediately; second hangs connected
        let connector = MockConnector::new(vec![vec![None], vec![]]);
        let (mut manager, mut rx) =
            SessionManager::new(connector.clone(), Duration::from_millis(20));

        manager.apply(Some(7), Some("tok")).await;

        // Connected -> Disconnected -> Connected again via the redial policy
        wait_until(|| connector.dials() >= 2).await;
        wait_until(|| manager.is_connected()).await;

        let mut saw_disconnect = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, SessionEvent::Disconnected { .. }) {
                saw_disconnect = true;
            }
        }
        assert!(saw_disconnect);

        // Same handle throughout: redial is the loop's job, not the manager's
        assert!(manager.handle().is_some());

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn test_error_frame_clears_flag_but_keeps_handle() {
        // The broker reports an error but never closes the transport; the
        // flag and the handle are allowed to disagree.
        let connector = MockConnector::new(vec![vec![error_frame("subscription refused")]]);
        let (mut manager, mut rx) = SessionManager::new(connector.clone(), Duration::from_secs(5));

        manager.apply(Some(7), Some("tok")).await;
        wait_until(|| manager.last_error().is_some()).await;

        assert!(!manager.is_connected());
        assert!(manager.handle().is_some());
        assert!(manager.handle().unwrap().is_live());
        assert_eq!(
            manager.last_error().as_deref(),
            Some("subscription refused")
        );
        assert_eq!(connector.dials(), 1);

        let mut saw_protocol_error = false;
        while let Ok(event) = rx.try_recv() {
            if let SessionEvent::ProtocolError { message } = event {
                assert_eq!(message, "subscription refused");
                saw_protocol_error = true;
            }
        }
        assert!(saw_protocol_error);

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn test_send_chat_without_handle_fails() {
        let connector = MockConnector::new(vec![]);
        let (manager, _rx) = SessionManager::new(connector, Duration::from_secs(5));

        let result = manager.send_chat("hello");
        assert!(matches!(result, Err(SessionError::NotConnected)));
    }

    #[tokio::test]
    async fn test_send_chat_reaches_transport() {
        let connector = MockConnector::new(vec![vec![]]);
        let (mut manager, _rx) = SessionManager::new(connector.clone(), Duration::from_secs(5));

        manager.apply(Some(7), Some("tok")).await;
        wait_until(|| manager.is_connected()).await;

        manager.send_chat("crushed leg day").unwrap();
        wait_until(|| !connector.sent().is_empty()).await;

        let sent = connector.sent();
        assert!(sent[0].contains("\"type\":\"chat\""));
        assert!(sent[0].contains("crushed leg day"));

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn test_inbound_frames_are_forwarded() {
        let connector = MockConnector::new(vec![vec![chat_frame("rest day?")]]);
        let (mut manager, mut rx) = SessionManager::new(connector, Duration::from_secs(5));

        manager.apply(Some(7), Some("tok")).await;

        let mut saw_chat = false;
        for _ in 0..10 {
            match tokio::time::timeout(Duration::from_secs(1), rx.recv()).await {
                Ok(Some(SessionEvent::Frame(ServerFrame::Chat { body, .. }))) => {
                    assert_eq!(body, "rest day?");
                    saw_chat = true;
                    break;
                }
                Ok(Some(_)) => continue,
                _ => break,
            }
        }
        assert!(saw_chat);

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let connector = MockConnector::new(vec![vec![]]);
        let (mut manager, _rx) = SessionManager::new(connector, Duration::from_secs(5));

        manager.apply(Some(7), Some("tok")).await;
        wait_until(|| manager.is_connected()).await;

        manager.shutdown().await;
        manager.shutdown().await;
        assert_eq!(manager.state(), SessionState::Idle);
    }
}
