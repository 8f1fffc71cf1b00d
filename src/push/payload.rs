//! Push Payload Types
//!
//! Inbound payload schema from the platform push service and its mapping
//! onto displayable notifications. Every field is optional on the wire;
//! defaults are applied here so the receiver never deals with holes.

use serde::Deserialize;

/// Fixed notification tag: repeated notifications of the same kind collapse
/// into one instead of stacking indefinitely.
pub const NOTIFICATION_TAG: &str = "huddle-push";

/// Title shown when the payload carries none
pub const DEFAULT_TITLE: &str = "Huddle";

/// Icon shown when the payload carries none
pub const DEFAULT_ICON: &str = "/icons/icon-192.png";

/// Navigation target when the payload carries none
pub const DEFAULT_PATH: &str = "/";

/// Inbound push payload: `{ "data": { title?, body?, icon?, path? } }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub data: PushData,
}

/// Payload data fields, all optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushData {
    pub title: Option<String>,
    pub body: Option<String>,
    pub icon: Option<String>,
    pub path: Option<String>,
}

/// A displayable OS notification with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    /// Collapse tag, always [`NOTIFICATION_TAG`]
    pub tag: String,
    /// URL opened when the notification is clicked
    pub url: String,
}

impl From<PushPayload> for Notification {
    fn from(payload: PushPayload) -> Self {
        let data = payload.data;
        Self {
            title: data.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: data.body.unwrap_or_default(),
            icon: data.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
            tag: NOTIFICATION_TAG.to_string(),
            url: data.path.unwrap_or_else(|| DEFAULT_PATH.to_string()),
        }
    }
}
