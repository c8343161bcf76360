//! Authentication: session lifecycle, route guarding, credential storage.
//!
//! This module provides:
//! - `SessionManager`/`SessionStore`: token lifecycle, startup validation,
//!   login/logout, and the `is_authenticated`/`is_admin` predicates
//! - `guard`: the pure render/redirect/deny decision for navigation targets
//! - `CredentialStore`: OS-keychain storage of the login password
//!
//! The session (token + identity) is persisted to disk and re-validated
//! against the service on every startup.

pub mod credentials;
pub mod guard;
pub mod session;

pub use credentials::CredentialStore;
pub use guard::{GuardDecision, RouteRequirements};
pub use session::{Credentials, SessionManager, SessionState, SessionStore, StoredSession, UserIdentity};
