//! Route guard.
//!
//! A pure decision function consulted on every navigation attempt. The
//! guard owns navigation policy only; it never mutates session state and
//! carries the interrupted route so login can resume it.

use crate::reducers::session::SessionState;
use crate::state::Role;

/// Access requirement declared per route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteRequirement {
    /// Anyone may enter, anonymous included.
    Public,

    /// An authenticated identity is required. An empty role set admits any
    /// authenticated role; a non-empty set admits only the listed roles.
    Protected(Vec<Role>),
}

impl RouteRequirement {
    /// Requirement admitting any authenticated identity.
    #[must_use]
    pub const fn authenticated() -> Self {
        Self::Protected(Vec::new())
    }

    /// Requirement admitting administrators only.
    #[must_use]
    pub fn admin_only() -> Self {
        Self::Protected(vec![Role::Admin])
    }
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Proceed to the requested route.
    Allow,

    /// Anonymous caller on a protected route: go to login, then come back.
    RedirectToLogin {
        /// The route the caller was trying to reach.
        return_to: String,
    },

    /// Authenticated caller lacking the required role: go home.
    RedirectToHome,
}

/// Evaluate a navigation attempt against the current session.
///
/// Decision table over (session, requirement):
/// - `Public` always allows.
/// - `Protected` with an anonymous session redirects to login with the
///   attempted route as the return path.
/// - `Protected(roles)` with an authenticated session allows iff `roles` is
///   empty or contains the identity's role; otherwise redirects home.
#[must_use]
pub fn evaluate(session: &SessionState, requirement: &RouteRequirement, route: &str) -> GuardDecision {
    let RouteRequirement::Protected(roles) = requirement else {
        return GuardDecision::Allow;
    };

    let Some(identity) = session.current_identity() else {
        return GuardDecision::RedirectToLogin {
            return_to: route.to_string(),
        };
    };

    if roles.is_empty() || roles.contains(&identity.role) {
        GuardDecision::Allow
    } else {
        GuardDecision::RedirectToHome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Credential, Identity, Role, UserId};

    fn authenticated(role: Role) -> SessionState {
        let mut state = SessionState::default();
        state.install_identity_for_tests(Identity {
            user_id: UserId::new(),
            username: "ada".to_string(),
            role,
            credential: Credential::new("token".to_string()),
            email: None,
            first_name: None,
            last_name: None,
        });
        state
    }

    #[test]
    fn test_public_routes_always_allow() {
        let anonymous = SessionState::default();
        assert_eq!(
            evaluate(&anonymous, &RouteRequirement::Public, "/events"),
            GuardDecision::Allow
        );
        assert_eq!(
            evaluate(&authenticated(Role::User), &RouteRequirement::Public, "/events"),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_anonymous_on_protected_redirects_to_login_with_return_path() {
        let anonymous = SessionState::default();
        let decision = evaluate(&anonymous, &RouteRequirement::admin_only(), "/admin");
        assert_eq!(
            decision,
            GuardDecision::RedirectToLogin {
                return_to: "/admin".to_string()
            }
        );
    }

    #[test]
    fn test_empty_role_set_admits_any_authenticated_role() {
        for role in [Role::User, Role::Admin] {
            assert_eq!(
                evaluate(&authenticated(role), &RouteRequirement::authenticated(), "/my-tickets"),
                GuardDecision::Allow
            );
        }
    }

    #[test]
    fn test_wrong_role_redirects_home() {
        assert_eq!(
            evaluate(&authenticated(Role::User), &RouteRequirement::admin_only(), "/admin"),
            GuardDecision::RedirectToHome
        );
        assert_eq!(
            evaluate(&authenticated(Role::Admin), &RouteRequirement::admin_only(), "/admin"),
            GuardDecision::Allow
        );
    }
}
