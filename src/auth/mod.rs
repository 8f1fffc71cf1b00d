//! Authentication
//!
//! - [`guard`]: pure route-guard decision over identity and role
//! - [`oauth`]: one-shot completion of the social-login redirect

pub mod guard;
pub mod oauth;

pub use guard::{evaluate, GuardDecision, GuardPolicy, IdentityState, Role};
pub use oauth::{AuthSession, CallbackOutcome, CallbackParams, OauthClient};

/// Route of the login entry point
pub const LOGIN_ROUTE: &str = "/login";

/// Default post-login landing route
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// Errors from authentication operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The redirect arrived without one of its credential fragments
    #[error("Social login failed: missing redirect credentials")]
    MissingParams,

    /// The credential exchange was refused
    #[error("Credential exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
}
