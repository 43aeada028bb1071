use std::collections::HashMap;

use crate::report::*;

/// The stored user names and passwords. Compared as plain strings.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CredentialStore {
    entries: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(entries: HashMap<String, String>) -> CredentialStore {
        CredentialStore { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        self.entries.get(username).map(|p| p.as_str()) == Some(password)
    }
}

/// The state of one user session. Starts logged out.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Session {
    username: Option<String>,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Checks a user name and password against the store.
    ///
    /// On a mismatch the session is left as it was.
    pub fn login(
        &mut self,
        store: &CredentialStore,
        username: &str,
        password: &str,
    ) -> ReportResult<()> {
        if !store.matches(username, password) {
            warn!("login: authentication failed for {:?}", username);
            return AuthenticationMismatchSnafu { username }.fail();
        }
        info!("login: {:?} authenticated", username);
        self.username = Some(username.to_string());
        Ok(())
    }
}
