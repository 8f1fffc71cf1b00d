//! Push Notifications
//!
//! Turns platform-delivered push payloads into OS-level notifications and
//! routes notification clicks back into the application. The receiver runs
//! in its own background task, fed only by platform events over a channel,
//! independent of the page/session lifecycle.

mod payload;
mod receiver;

pub use payload::{
    Notification, PushData, PushPayload, DEFAULT_ICON, DEFAULT_PATH, DEFAULT_TITLE,
    NOTIFICATION_TAG,
};
pub use receiver::{NotificationSink, PushEvent, PushReceiver, TracingSink};
