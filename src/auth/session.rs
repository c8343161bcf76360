//! Session management: the stored token/identity pair and the state machine
//! built on top of it.
//!
//! The session is owned by a single `SessionManager`; every other part of
//! the app reads it through the `is_authenticated`/`is_admin` predicates or
//! the `state()` snapshot. Remote failures never escape this module as
//! panics: `login` hands back a typed error for display and `bootstrap`
//! degrades silently to the signed-out state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::api::ApiError;
use crate::models::Role;

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// Login credentials. Transient: serialized for the login call, never
/// written to disk (the password optionally goes to the OS keychain).
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub id: String,
    pub password: String,
}

/// The identity half of a stored session. The role is cached for display
/// between startup and re-validation; the server's answer always wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    #[serde(rename = "type")]
    pub role: Role,
}

/// What gets persisted between runs: always the token and identity
/// together, never one without the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: UserIdentity,
}

/// Disk persistence for the session, one JSON file in the data directory.
pub struct SessionStore {
    data_dir: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Load the stored session, if any
    pub fn load(&self) -> Result<Option<StoredSession>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&path).context("Failed to read session file")?;
        let session: StoredSession =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &StoredSession) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Remove the stored session. Safe to call when nothing is stored.
    pub fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }
}

/// Authentication state as seen by the rest of the app.
///
/// `Unknown` only exists between process start and the end of
/// `bootstrap()`; the UI holds off rendering protected content until the
/// manager has left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unknown,
    Authenticated(Role),
    Unauthenticated,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, SessionState::Authenticated(Role::Admin))
    }
}

/// Role resolution after a successful login.
///
/// A failed admin check does not undo the authentication: the token is
/// already known good, so the account keeps the least-privileged role
/// until the next validation. Fail-open on role only, never on
/// authentication.
fn role_from_admin_check(check: Result<bool, ApiError>) -> Role {
    match check {
        Ok(true) => Role::Admin,
        Ok(false) => Role::User,
        Err(e) => {
            debug!(error = %e, "Admin check failed after login, defaulting to user role");
            Role::User
        }
    }
}

/// Owner of the session: token lifecycle, startup validation, login and
/// logout. The API client is passed in so the manager can keep the
/// client's bearer token in step with the session.
pub struct SessionManager {
    store: SessionStore,
    state: SessionState,
    user: Option<UserIdentity>,
}

impl SessionManager {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            state: SessionState::Unknown,
            user: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state.is_admin()
    }

    /// Validate any stored session against the service. Runs once at
    /// startup, before the UI renders protected content.
    ///
    /// No stored session means no network call: the manager goes straight
    /// to `Unauthenticated`. A stored session is confirmed with the admin
    /// check; on success the cached role is reconciled with the server's
    /// answer, on any failure the stale session is discarded silently (an
    /// expired token is the normal "not logged in" condition, not an
    /// anomaly worth surfacing).
    pub async fn bootstrap(&mut self, api: &mut ApiClient) {
        let stored = match self.store.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                debug!("No stored session");
                self.state = SessionState::Unauthenticated;
                return;
            }
            Err(e) => {
                warn!(error = %e, "Unreadable session file, discarding");
                let _ = self.store.clear();
                self.state = SessionState::Unauthenticated;
                return;
            }
        };

        api.set_token(stored.token.clone());

        match api.is_admin().await {
            Ok(is_admin) => {
                let role = if is_admin { Role::Admin } else { Role::User };
                let user = UserIdentity {
                    id: stored.user.id,
                    role,
                };
                if let Err(e) = self.store.save(&StoredSession {
                    token: stored.token,
                    user: user.clone(),
                }) {
                    warn!(error = %e, "Failed to persist revalidated session");
                }
                debug!(user = %user.id, role = %role, "Stored session validated");
                self.user = Some(user);
                self.state = SessionState::Authenticated(role);
            }
            Err(e) => {
                warn!(error = %e, "Stored token failed validation, signing out");
                self.reset(api);
            }
        }
    }

    /// Authenticate against the service.
    ///
    /// On success the token is persisted and the role fetched with a
    /// follow-up admin check; if that second call fails the login still
    /// stands and the account is treated as a regular user until the next
    /// validation (fail-open on role only, never on authentication). On
    /// failure any partially-set session data is cleared and the typed
    /// error is returned for display.
    pub async fn login(
        &mut self,
        api: &mut ApiClient,
        credentials: &Credentials,
    ) -> Result<(), ApiError> {
        let token = match api.login(credentials).await {
            Ok(token) => token,
            Err(e) => {
                self.reset(api);
                return Err(e);
            }
        };

        api.set_token(token.clone());

        let role = role_from_admin_check(api.is_admin().await);

        let user = UserIdentity {
            id: credentials.id.clone(),
            role,
        };

        if let Err(e) = self.store.save(&StoredSession {
            token,
            user: user.clone(),
        }) {
            warn!(error = %e, "Failed to persist session");
        }

        self.user = Some(user);
        self.state = SessionState::Authenticated(role);
        Ok(())
    }

    /// Discard the session unconditionally. Synchronous, idempotent, no
    /// network call.
    pub fn logout(&mut self, api: &mut ApiClient) {
        self.reset(api);
    }

    fn reset(&mut self, api: &mut ApiClient) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored session");
        }
        api.clear_token();
        self.user = None;
        self.state = SessionState::Unauthenticated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Client pointed at a port nothing listens on; any request fails fast
    fn unreachable_api() -> ApiClient {
        ApiClient::new("http://127.0.0.1:9".to_string()).unwrap()
    }

    fn manager_in(dir: &std::path::Path) -> SessionManager {
        SessionManager::new(SessionStore::new(dir.to_path_buf()))
    }

    #[test]
    fn test_admin_implies_authenticated() {
        let states = [
            SessionState::Unknown,
            SessionState::Unauthenticated,
            SessionState::Authenticated(Role::User),
            SessionState::Authenticated(Role::Admin),
        ];
        for state in states {
            if state.is_admin() {
                assert!(state.is_authenticated());
            }
        }
    }

    #[test]
    fn test_role_fail_open_on_admin_check() {
        assert_eq!(role_from_admin_check(Ok(true)), Role::Admin);
        assert_eq!(role_from_admin_check(Ok(false)), Role::User);
        // A failed check never blocks the login, it only withholds admin
        assert_eq!(
            role_from_admin_check(Err(ApiError::Unauthorized)),
            Role::User
        );
        assert_eq!(
            role_from_admin_check(Err(ApiError::InvalidResponse("garbage".into()))),
            Role::User
        );
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());

        assert!(store.load().unwrap().is_none());

        let session = StoredSession {
            token: "tok".to_string(),
            user: UserIdentity {
                id: "alice".to_string(),
                role: Role::Admin,
            },
        };
        store.save(&session).unwrap();

        let loaded = store.load().unwrap().expect("session should persist");
        assert_eq!(loaded.token, "tok");
        assert_eq!(loaded.user.role, Role::Admin);

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing an already-empty store is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_stored_session_uses_type_field() {
        let session = StoredSession {
            token: "tok".to_string(),
            user: UserIdentity {
                id: "alice".to_string(),
                role: Role::User,
            },
        };
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["user"]["type"], "user");
    }

    #[tokio::test]
    async fn test_bootstrap_without_stored_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(dir.path());
        let mut api = unreachable_api();

        assert_eq!(manager.state(), SessionState::Unknown);
        // Completes without touching the (unreachable) network
        manager.bootstrap(&mut api).await;

        assert_eq!(manager.state(), SessionState::Unauthenticated);
        assert!(!manager.is_authenticated());
        assert!(!api.has_token());
    }

    #[tokio::test]
    async fn test_bootstrap_failing_validation_clears_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());
        store
            .save(&StoredSession {
                token: "stale".to_string(),
                user: UserIdentity {
                    id: "bob".to_string(),
                    role: Role::Admin,
                },
            })
            .unwrap();

        let mut manager = manager_in(dir.path());
        let mut api = unreachable_api();
        manager.bootstrap(&mut api).await;

        assert_eq!(manager.state(), SessionState::Unauthenticated);
        assert!(!api.has_token());
        assert!(store.load().unwrap().is_none(), "stale session must be discarded");
    }

    #[tokio::test]
    async fn test_login_failure_leaves_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(dir.path());
        let mut api = unreachable_api();

        let credentials = Credentials {
            id: "alice".to_string(),
            password: "p".to_string(),
        };
        let result = manager.login(&mut api, &credentials).await;

        assert!(result.is_err());
        assert_eq!(manager.state(), SessionState::Unauthenticated);
        assert!(!api.has_token());
        let store = SessionStore::new(dir.path().to_path_buf());
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(dir.path());
        let mut api = unreachable_api();

        manager.logout(&mut api);
        assert_eq!(manager.state(), SessionState::Unauthenticated);
        manager.logout(&mut api);
        assert_eq!(manager.state(), SessionState::Unauthenticated);
        assert!(manager.user().is_none());
    }
}
