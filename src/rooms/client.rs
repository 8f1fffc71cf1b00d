//! Room Join Client
//!
//! One remote call turns a user-entered code into room membership. The
//! pending flag keeps submissions single-flight: while a join is in the
//! air, further submissions are rejected instead of queued. Exactly one
//! attempt is made per submission; retry is a user decision.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::{normalize_code, RoomError, RoomId};

/// Client for room membership calls
pub struct RoomClient {
    client: Client,
    base_url: String,
    pending: AtomicBool,
}

/// Outcome of a join submission
#[derive(Debug)]
pub enum JoinOutcome {
    /// Membership registered; callers should refetch room state
    Joined(RoomSummary),
    /// Empty or whitespace-only code; no call was made
    EmptyCode,
}

/// Room summary returned by the join endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub name: String,
    #[serde(default)]
    pub member_count: u32,
}

#[derive(Serialize)]
struct JoinRequest<'a> {
    code: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl RoomClient {
    /// Create a new room client against the given API base URL
    pub fn new(base_url: impl Into<String>, request_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            pending: AtomicBool::new(false),
        }
    }

    /// True while a join call is in flight
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Submit a room code for membership.
    ///
    /// The raw code is normalized first; an empty result is silently
    /// rejected without a network call. Returns [`RoomError::InFlight`]
    /// when a previous submission has not resolved yet.
    pub async fn join_by_code(
        &self,
        credential: &str,
        raw_code: &str,
    ) -> Result<JoinOutcome, RoomError> {
        let code = normalize_code(raw_code);
        if code.is_empty() {
            return Ok(JoinOutcome::EmptyCode);
        }

        // Single-flight: only the submission that flips the flag proceeds.
        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(RoomError::InFlight);
        }

        let result = self.send_join(credential, &code).await;
        self.pending.store(false, Ordering::Release);

        match &result {
            Ok(JoinOutcome::Joined(room)) => {
                tracing::info!(room_id = room.room_id, code = %code, "Joined room");
            }
            Err(e) => {
                tracing::warn!(code = %code, error = %e, "Room join failed");
            }
            _ => {}
        }

        result
    }

    async fn send_join(&self, credential: &str, code: &str) -> Result<JoinOutcome, RoomError> {
        let url = format!("{}/rooms/join", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential)
            .json(&JoinRequest { code })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| format!("Could not join room ({})", status));
            return Err(RoomError::Rejected(message));
        }

        let summary: RoomSummary = response
            .json()
            .await
            .map_err(|e| RoomError::Api(e.to_string()))?;

        Ok(JoinOutcome::Joined(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> RoomClient {
        RoomClient::new("http://localhost:9", 1)
    }

    #[tokio::test]
    async fn test_empty_code_is_silently_rejected() {
        let client = test_client();
        // Whitespace-only input never reaches the network (port 9 would fail)
        let outcome = client.join_by_code("tok", "   ").await.unwrap();
        assert!(matches!(outcome, JoinOutcome::EmptyCode));
        assert!(!client.is_pending());
    }

    #[tokio::test]
    async fn test_pending_flag_blocks_second_submission() {
        let client = test_client();
        client.pending.store(true, Ordering::Release);

        let result = client.join_by_code("tok", "ABCD").await;
        assert!(matches!(result, Err(RoomError::InFlight)));
    }

    #[tokio::test]
    async fn test_pending_clears_after_failed_attempt() {
        let client = test_client();
        // Nothing listens on port 9, so the single attempt fails fast
        let result = client.join_by_code("tok", "ABCD").await;
        assert!(result.is_err());
        assert!(!client.is_pending());
    }

    #[test]
    fn test_error_body_parsing() {
        let body: ErrorBody = serde_json::from_str(r#"{"message": "Room is full"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("Room is full"));

        let body: ErrorBody = serde_json::from_str(r#"{}"#).unwrap();
        assert!(body.message.is_none());
    }

    #[test]
    fn test_room_summary_parsing() {
        let summary: RoomSummary =
            serde_json::from_str(r#"{"room_id": 42, "name": "Morning Crew"}"#).unwrap();
        assert_eq!(summary.room_id, 42);
        assert_eq!(summary.name, "Morning Crew");
        assert_eq!(summary.member_count, 0);
    }
}
