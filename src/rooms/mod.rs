//! Workout Rooms
//!
//! Room membership by short invite code:
//! - [`normalize_code`]: entry-correction normalization of human-typed codes
//! - [`RoomClient`]: one-shot join call against the remote API

mod client;
mod codes;

pub use client::{JoinOutcome, RoomClient, RoomSummary};
pub use codes::{normalize_code, MAX_CODE_LEN};

/// Identifier of a workout room. `None` at call sites means "no active room".
pub type RoomId = u32;

/// Errors from room membership operations
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// A join call is already in flight; the pending flag blocks re-submission
    #[error("A join request is already in progress")]
    InFlight,

    /// The remote service rejected the join (its message is user-visible)
    #[error("{0}")]
    Rejected(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
}
