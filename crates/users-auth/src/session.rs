//! Sign-in sessions
//!
//! A successful AUTH creates a [`SignInSession`] keyed by an opaque
//! [`SecurityToken`]. The store is internally locked; expired sessions are
//! dropped lazily on lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

use users_org::UserId;

/// Length of a generated security token in characters.
const TOKEN_LENGTH: usize = 40;

/// An opaque session token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecurityToken(String);

impl SecurityToken {
    /// Generate a fresh random token.
    pub fn random() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();
        Self(token)
    }

    /// Wrap a token received from a client.
    pub fn from_client(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecurityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An active sign-in session.
#[derive(Debug, Clone)]
pub struct SignInSession {
    /// The session token
    pub token: SecurityToken,

    /// The signed-in user
    pub user_id: UserId,

    /// The realm the user signed in to, if any
    pub realm: Option<String>,

    /// When the session expires
    pub expires: DateTime<Utc>,
}

impl SignInSession {
    /// Creates a session for a user with the given lifetime.
    pub fn new(user_id: UserId, realm: Option<String>, lifetime: Duration) -> Self {
        Self {
            token: SecurityToken::random(),
            user_id,
            realm,
            expires: Utc::now() + lifetime,
        }
    }

    /// Whether the session is past its expiry.
    pub fn is_expired(&self) -> bool {
        self.expires <= Utc::now()
    }
}

/// Thread-safe store of active sessions keyed by token.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, SignInSession>>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session.
    pub fn insert(&self, session: SignInSession) {
        let mut inner = self.inner.lock().expect("session store poisoned");
        inner.insert(session.token.as_str().to_owned(), session);
    }

    /// Look up a session by token.
    ///
    /// Expired sessions are removed on the spot and reported as absent.
    pub fn lookup(&self, token: &SecurityToken) -> Option<SignInSession> {
        let mut inner = self.inner.lock().expect("session store poisoned");
        match inner.get(token.as_str()) {
            Some(session) if !session.is_expired() => Some(session.clone()),
            Some(_) => {
                inner.remove(token.as_str());
                None
            }
            None => None,
        }
    }

    /// Drop a session; `false` when the token was unknown.
    pub fn revoke(&self, token: &SecurityToken) -> bool {
        let mut inner = self.inner.lock().expect("session store poisoned");
        inner.remove(token.as_str()).is_some()
    }

    /// Number of stored sessions, including not-yet-collected expired ones.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("session store poisoned").len()
    }

    /// Whether no session is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::parse("alice").unwrap()
    }

    #[test]
    fn test_tokens_are_long_and_unique() {
        let a = SecurityToken::random();
        let b = SecurityToken::random();
        assert_eq!(a.as_str().len(), 40);
        assert_ne!(a, b);
    }

    #[test]
    fn test_insert_and_lookup() {
        let store = SessionStore::new();
        let session = SignInSession::new(user(), None, Duration::days(30));
        let token = session.token.clone();
        store.insert(session);

        let found = store.lookup(&token).unwrap();
        assert_eq!(found.user_id, user());
        assert!(!found.is_expired());
    }

    #[test]
    fn test_expired_sessions_are_dropped_on_lookup() {
        let store = SessionStore::new();
        let session = SignInSession::new(user(), None, Duration::seconds(-1));
        let token = session.token.clone();
        store.insert(session);

        assert!(store.lookup(&token).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_revoke() {
        let store = SessionStore::new();
        let session = SignInSession::new(user(), Some("api".into()), Duration::days(1));
        let token = session.token.clone();
        store.insert(session);

        assert!(store.revoke(&token));
        assert!(!store.revoke(&token));
        assert!(store.lookup(&token).is_none());
    }
}
