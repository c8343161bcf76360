//! Route guarding: the decision of whether a navigation target may render
//! for the current session.
//!
//! The guard is a pure function over the session state; callers evaluate
//! it on every navigation (and guarded views on every frame) rather than
//! caching the answer.

use super::SessionState;

/// What a navigation target demands of the session.
/// Requiring admin implies requiring authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteRequirements {
    pub require_auth: bool,
    pub require_admin: bool,
}

impl RouteRequirements {
    pub const AUTHENTICATED: RouteRequirements = RouteRequirements {
        require_auth: true,
        require_admin: false,
    };

    pub const ADMIN: RouteRequirements = RouteRequirements {
        require_auth: true,
        require_admin: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// The target may render
    Render,
    /// Not signed in: send the user to the login screen
    RedirectToLogin,
    /// Signed in but lacking the admin role: show the refusal notice
    AccessDenied,
}

/// Decide whether a target may render given the current session state.
pub fn evaluate(state: SessionState, requirements: RouteRequirements) -> GuardDecision {
    let needs_auth = requirements.require_auth || requirements.require_admin;

    if needs_auth && !state.is_authenticated() {
        return GuardDecision::RedirectToLogin;
    }
    if requirements.require_admin && !state.is_admin() {
        return GuardDecision::AccessDenied;
    }
    GuardDecision::Render
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_unauthenticated_is_redirected() {
        assert_eq!(
            evaluate(SessionState::Unauthenticated, RouteRequirements::AUTHENTICATED),
            GuardDecision::RedirectToLogin
        );
        assert_eq!(
            evaluate(SessionState::Unauthenticated, RouteRequirements::ADMIN),
            GuardDecision::RedirectToLogin
        );
    }

    #[test]
    fn test_non_admin_is_refused_admin_targets() {
        assert_eq!(
            evaluate(
                SessionState::Authenticated(Role::User),
                RouteRequirements::ADMIN
            ),
            GuardDecision::AccessDenied
        );
    }

    #[test]
    fn test_admin_renders_admin_targets() {
        assert_eq!(
            evaluate(
                SessionState::Authenticated(Role::Admin),
                RouteRequirements::ADMIN
            ),
            GuardDecision::Render
        );
    }

    #[test]
    fn test_authenticated_renders_plain_targets() {
        for role in [Role::User, Role::Admin] {
            assert_eq!(
                evaluate(
                    SessionState::Authenticated(role),
                    RouteRequirements::AUTHENTICATED
                ),
                GuardDecision::Render
            );
        }
    }

    #[test]
    fn test_public_targets_render_in_every_state() {
        let states = [
            SessionState::Unknown,
            SessionState::Unauthenticated,
            SessionState::Authenticated(Role::User),
            SessionState::Authenticated(Role::Admin),
        ];
        for state in states {
            // A target that requires nothing is public
            assert_eq!(
                evaluate(state, RouteRequirements::default()),
                GuardDecision::Render
            );
        }
    }

    #[test]
    fn test_unknown_state_is_treated_as_signed_out() {
        // Pre-bootstrap navigation must never reach protected content
        assert_eq!(
            evaluate(SessionState::Unknown, RouteRequirements::AUTHENTICATED),
            GuardDecision::RedirectToLogin
        );
        assert_eq!(
            evaluate(SessionState::Unknown, RouteRequirements::ADMIN),
            GuardDecision::RedirectToLogin
        );
    }

    #[test]
    fn test_admin_requirement_implies_auth_requirement() {
        // Even a malformed requirements value (admin without auth) must not
        // let an unauthenticated session through
        let odd = RouteRequirements {
            require_auth: false,
            require_admin: true,
        };
        assert_eq!(
            evaluate(SessionState::Unauthenticated, odd),
            GuardDecision::RedirectToLogin
        );
    }
}
