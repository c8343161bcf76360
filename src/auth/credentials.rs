// Allow dead code: Infrastructure methods for future use
#![allow(dead_code)]

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "confdeck";

/// OS-keychain storage for the login password, keyed by username.
/// Only the password lives here; the session token is persisted by the
/// session store.
pub struct CredentialStore;

impl CredentialStore {
    /// Store a password in the OS keychain
    pub fn store(username: &str, password: &str) -> Result<()> {
        let entry =
            Entry::new(SERVICE_NAME, username).context("Failed to create keyring entry")?;
        entry
            .set_password(password)
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Retrieve the stored password for a username
    pub fn get_password(username: &str) -> Result<String> {
        let entry =
            Entry::new(SERVICE_NAME, username).context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    /// Delete the stored password for a username
    pub fn delete(username: &str) -> Result<()> {
        let entry =
            Entry::new(SERVICE_NAME, username).context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete credential from keychain")?;
        Ok(())
    }

    /// Check whether a password is stored for a username
    pub fn has_credentials(username: &str) -> bool {
        Entry::new(SERVICE_NAME, username)
            .map(|entry| entry.get_password().is_ok())
            .unwrap_or(false)
    }
}
