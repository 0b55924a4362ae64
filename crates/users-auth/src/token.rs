//! Single-use e-mail verification tokens
//!
//! Sign-up creates a token that is mailed to the user; visiting the
//! verification URL consumes it. Consumption removes the token under the
//! store lock, so two concurrent requests can never both succeed.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

use users_org::UserId;

/// Length of a generated verification token in characters.
const TOKEN_LENGTH: usize = 32;

/// A pending e-mail verification.
#[derive(Debug, Clone)]
pub struct VerificationToken {
    /// The token value sent to the user
    pub token: String,

    /// The user awaiting verification
    pub user_id: UserId,

    /// When the token was created
    pub created_at: DateTime<Utc>,
}

/// Thread-safe store of pending verification tokens keyed by token value.
#[derive(Debug, Default)]
pub struct VerificationTokenStore {
    inner: Mutex<HashMap<String, VerificationToken>>,
}

impl VerificationTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a token for a user.
    pub fn create(&self, user_id: UserId) -> VerificationToken {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();
        let entry = VerificationToken {
            token: token.clone(),
            user_id,
            created_at: Utc::now(),
        };
        let mut inner = self.inner.lock().expect("verification store poisoned");
        inner.insert(token, entry.clone());
        entry
    }

    /// Consume a token: remove it and return its payload.
    ///
    /// Single-use by construction; a second call with the same value
    /// returns `None`.
    pub fn take(&self, token: &str) -> Option<VerificationToken> {
        let mut inner = self.inner.lock().expect("verification store poisoned");
        inner.remove(token)
    }

    /// Number of pending tokens.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("verification store poisoned").len()
    }

    /// Whether no token is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_take_is_single_use() {
        let store = VerificationTokenStore::new();
        let alice = UserId::parse("alice").unwrap();
        let created = store.create(alice.clone());

        let taken = store.take(&created.token).unwrap();
        assert_eq!(taken.user_id, alice);

        // Second consumption fails.
        assert!(store.take(&created.token).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_token_is_none() {
        let store = VerificationTokenStore::new();
        assert!(store.take("nope").is_none());
    }

    #[test]
    fn test_tokens_are_distinct() {
        let store = VerificationTokenStore::new();
        let alice = UserId::parse("alice").unwrap();
        let a = store.create(alice.clone());
        let b = store.create(alice);
        assert_ne!(a.token, b.token);
        assert_eq!(store.len(), 2);
    }
}
