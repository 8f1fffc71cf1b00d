//! # Huddle
//!
//! Client core for a social fitness-accountability app: users join workout
//! rooms by short code, chat in real time, and receive push notifications.
//!
//! ## Modules
//!
//! - [`session`]: realtime session manager, owner of the single live broker
//!   connection keyed by (room id, credential)
//! - [`rooms`]: room code normalization and the join-by-code call
//! - [`auth`]: route guard and social-login completion
//! - [`push`]: background push receiver and notification routing
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use huddle::session::{SessionEvent, SessionManager, WsConnector};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let connector = Arc::new(WsConnector::new("wss://rt.huddle.fit"));
//!     let (mut manager, mut events) =
//!         SessionManager::new(connector, Duration::from_millis(5000));
//!
//!     // Opening is keyed on (room id, credential); changing either key
//!     // tears the old connection down before dialing the new one.
//!     manager.apply(Some(7), Some("bearer-token")).await;
//!
//!     while let Some(event) = events.recv().await {
//!         if let SessionEvent::Frame(frame) = event {
//!             println!("{:?}", frame);
//!         }
//!     }
//!
//!     manager.shutdown().await;
//! }
//! ```

pub mod auth;
pub mod config;
pub mod push;
pub mod rooms;
pub mod session;

// Re-export top-level types for convenience
pub use session::{
    ClientFrame, ConnectionHandle, Connector, ServerFrame, SessionError, SessionEvent,
    SessionManager, SessionState, Transport, WsConnector,
};

pub use rooms::{normalize_code, JoinOutcome, RoomClient, RoomError, RoomId, RoomSummary};

pub use auth::{
    evaluate as evaluate_guard, AuthError, AuthSession, CallbackOutcome, CallbackParams,
    GuardDecision, GuardPolicy, IdentityState, OauthClient, Role,
};

pub use push::{Notification, NotificationSink, PushEvent, PushPayload, PushReceiver};

pub use config::{Config, ConfigError, LoggingConfig, PushConfig, RealtimeConfig};
