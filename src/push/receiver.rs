//! Push Receiver
//!
//! Background loop that consumes platform push events. It talks to the rest
//! of the world only through its inbound event channel and the outbound
//! [`NotificationSink`], mirroring how the platform's background context is
//! isolated from the page.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::payload::{Notification, PushPayload, DEFAULT_PATH};
use crate::config::PushConfig;

/// Events delivered by the platform push context
#[derive(Debug)]
pub enum PushEvent {
    /// A push payload arrived in the background
    Message(PushPayload),
    /// The user clicked a previously shown notification
    Clicked {
        /// URL carried by the notification, if any
        url: Option<String>,
    },
}

/// Where notifications are displayed and clicks are routed
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    /// Show (or update, by tag) an OS notification
    async fn display(&self, notification: Notification);

    /// Open or focus a window at the given URL
    async fn open(&self, url: &str);
}

/// Handle to the spawned receiver loop
pub struct PushReceiver {
    task: tokio::task::JoinHandle<()>,
}

impl PushReceiver {
    /// Spawn the receiver. The loop runs until the event channel closes.
    pub fn spawn(
        identity: PushConfig,
        events: mpsc::Receiver<PushEvent>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        if identity.is_placeholder() {
            tracing::warn!("Push identity not configured; running with placeholder values");
        } else {
            tracing::info!(project_id = %identity.project_id, "Push receiver starting");
        }

        let task = tokio::spawn(receive_loop(events, sink));
        Self { task }
    }

    /// True once the loop has exited
    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the receiver immediately
    pub fn shutdown(self) {
        self.task.abort();
    }
}

async fn receive_loop(mut events: mpsc::Receiver<PushEvent>, sink: Arc<dyn NotificationSink>) {
    while let Some(event) = events.recv().await {
        match event {
            PushEvent::Message(payload) => {
                let notification = Notification::from(payload);
                tracing::debug!(title = %notification.title, "Displaying push notification");
                sink.display(notification).await;
            }
            PushEvent::Clicked { url } => {
                let url = url.unwrap_or_else(|| DEFAULT_PATH.to_string());
                tracing::debug!(url = %url, "Notification clicked");
                sink.open(&url).await;
            }
        }
    }
    tracing::debug!("Push event channel closed; receiver stopping");
}

/// Sink that logs notifications instead of displaying them, for headless use
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn display(&self, notification: Notification) {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            tag = %notification.tag,
            "notification"
        );
    }

    async fn open(&self, url: &str) {
        tracing::info!(url = %url, "navigate");
    }
}
