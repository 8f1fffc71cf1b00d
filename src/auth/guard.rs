//! Route Guard
//!
//! A pure decision function over (loading, authenticated, role): no state,
//! no side effects. While identity is still loading nothing is decided, so
//! callers never redirect prematurely.

use serde::{Deserialize, Serialize};

use super::{DASHBOARD_ROUTE, LOGIN_ROUTE};

/// Role carried by an authenticated identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Coach,
    Admin,
}

/// Snapshot of the current identity as seen by the view layer
#[derive(Debug, Clone, Default)]
pub struct IdentityState {
    /// Identity lookup still in progress
    pub loading: bool,
    /// A session exists
    pub authenticated: bool,
    /// Role of the authenticated user, when known
    pub role: Option<Role>,
}

/// What a guarded view is allowed to require
#[derive(Debug, Clone)]
pub struct GuardPolicy {
    /// Roles that may see the guarded content. Empty = any authenticated
    /// identity passes.
    allowed: Vec<Role>,
    /// Route for authenticated users whose role is not allowed
    fallback: String,
}

impl GuardPolicy {
    /// Policy requiring one of the given roles, falling back to the dashboard
    pub fn allowing(roles: impl Into<Vec<Role>>) -> Self {
        Self {
            allowed: roles.into(),
            fallback: DASHBOARD_ROUTE.to_string(),
        }
    }

    /// Policy that only requires authentication
    pub fn authenticated_only() -> Self {
        Self::allowing(vec![])
    }

    /// Override the fallback route
    pub fn with_fallback(mut self, route: impl Into<String>) -> Self {
        self.fallback = route.into();
        self
    }
}

/// Outcome of evaluating the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render a neutral loading state and nothing else
    Loading,
    /// Redirect to the login entry point
    RedirectLogin,
    /// Redirect an authenticated-but-unauthorized user
    RedirectFallback(String),
    /// Render the guarded content unchanged
    Allow,
}

/// Decide what a guarded view should do for the given identity
pub fn evaluate(identity: &IdentityState, policy: &GuardPolicy) -> GuardDecision {
    if identity.loading {
        return GuardDecision::Loading;
    }
    if !identity.authenticated {
        return GuardDecision::RedirectLogin;
    }
    if policy.allowed.is_empty() {
        return GuardDecision::Allow;
    }
    match identity.role {
        Some(role) if policy.allowed.contains(&role) => GuardDecision::Allow,
        _ => GuardDecision::RedirectFallback(policy.fallback.clone()),
    }
}

/// Target route for a redirect decision, if any
pub fn redirect_target(decision: &GuardDecision) -> Option<&str> {
    match decision {
        GuardDecision::RedirectLogin => Some(LOGIN_ROUTE),
        GuardDecision::RedirectFallback(route) => Some(route),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(loading: bool, authenticated: bool, role: Option<Role>) -> IdentityState {
        IdentityState {
            loading,
            authenticated,
            role,
        }
    }

    #[test]
    fn test_loading_wins_regardless_of_other_inputs() {
        let policy = GuardPolicy::allowing(vec![Role::Admin]);
        assert_eq!(
            evaluate(&identity(true, false, None), &policy),
            GuardDecision::Loading
        );
        assert_eq!(
            evaluate(&identity(true, true, Some(Role::Admin)), &policy),
            GuardDecision::Loading
        );
    }

    #[test]
    fn test_unauthenticated_redirects_to_login() {
        let policy = GuardPolicy::allowing(vec![Role::Member]);
        let decision = evaluate(&identity(false, false, None), &policy);
        assert_eq!(decision, GuardDecision::RedirectLogin);
        assert_eq!(redirect_target(&decision), Some("/login"));
    }

    #[test]
    fn test_disallowed_role_redirects_to_default_fallback() {
        let policy = GuardPolicy::allowing(vec![Role::Admin]);
        let decision = evaluate(&identity(false, true, Some(Role::Member)), &policy);
        assert_eq!(
            decision,
            GuardDecision::RedirectFallback("/dashboard".to_string())
        );
        assert_eq!(redirect_target(&decision), Some("/dashboard"));
    }

    #[test]
    fn test_missing_role_counts_as_disallowed() {
        let policy = GuardPolicy::allowing(vec![Role::Admin]);
        assert!(matches!(
            evaluate(&identity(false, true, None), &policy),
            GuardDecision::RedirectFallback(_)
        ));
    }

    #[test]
    fn test_allowed_role_renders_children() {
        let policy = GuardPolicy::allowing(vec![Role::Member, Role::Coach]);
        assert_eq!(
            evaluate(&identity(false, true, Some(Role::Coach)), &policy),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_custom_fallback_route() {
        let policy = GuardPolicy::allowing(vec![Role::Admin]).with_fallback("/rooms");
        assert_eq!(
            evaluate(&identity(false, true, Some(Role::Member)), &policy),
            GuardDecision::RedirectFallback("/rooms".to_string())
        );
    }

    #[test]
    fn test_empty_allowed_set_only_requires_authentication() {
        let policy = GuardPolicy::authenticated_only();
        assert_eq!(
            evaluate(&identity(false, true, None), &policy),
            GuardDecision::Allow
        );
        assert_eq!(
            evaluate(&identity(false, false, None), &policy),
            GuardDecision::RedirectLogin
        );
    }
}
