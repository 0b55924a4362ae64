//! Salted password records
//!
//! A [`LoginPassword`] binds a login (and optional realm) to a salted
//! SHA-256 digest of the password. The plaintext is never stored; the
//! caller-supplied realm is kept exactly as given.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

use users_org::UserId;

/// A stored login/password credential.
#[derive(Debug, Clone)]
pub struct LoginPassword {
    /// The login this credential belongs to
    login: UserId,

    /// Optional authentication realm
    realm: Option<String>,

    /// Base64-encoded random salt
    salt: String,

    /// Base64-encoded SHA-256 digest of salt ‖ password
    digest: String,
}

impl LoginPassword {
    /// Creates a credential by salting and hashing the given password.
    ///
    /// # Examples
    ///
    /// ```
    /// use users_auth::LoginPassword;
    /// use users_org::UserId;
    ///
    /// let login = UserId::parse("alice").unwrap();
    /// let record = LoginPassword::new(login, "secret-password", Some("api".into()));
    /// assert_eq!(record.realm(), Some("api"));
    /// assert!(record.verify("secret-password"));
    /// ```
    pub fn new(login: UserId, password: &str, realm: Option<String>) -> Self {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = Self::hash(&salt, password);
        Self {
            login,
            realm,
            salt: BASE64.encode(salt),
            digest,
        }
    }

    /// The login this credential belongs to.
    pub fn login(&self) -> &UserId {
        &self.login
    }

    /// The authentication realm, if one was supplied.
    pub fn realm(&self) -> Option<&str> {
        self.realm.as_deref()
    }

    /// Check a password attempt against the stored digest.
    pub fn verify(&self, password: &str) -> bool {
        match BASE64.decode(&self.salt) {
            Ok(salt) => Self::hash(&salt, password) == self.digest,
            Err(_) => false,
        }
    }

    fn hash(salt: &[u8], password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        BASE64.encode(hasher.finalize())
    }
}
