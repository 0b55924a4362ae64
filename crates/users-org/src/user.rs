//! User aggregate
//!
//! The user entity mirrors the organization aggregate in a slimmer form:
//! identity plus profile fields. Organization membership lives on the
//! organization side as incoming user edges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::organization::I18nText;

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (the login name, immutable after construction)
    id: UserId,

    /// Display name
    pub name: String,

    /// E-mail address
    pub email: String,

    /// Telephone number
    pub telephone: Option<String>,

    /// Multi-language profile description
    pub description: I18nText,

    /// Whether the profile is visible in public listings
    pub is_public: bool,

    /// Whether the account is disabled
    pub is_disabled: bool,

    /// Whether the e-mail address has been verified
    pub is_authenticated: bool,

    /// When the user accepted the EULA, if they have
    pub accepted_eula: Option<DateTime<Utc>>,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new, not-yet-verified user account.
    ///
    /// New accounts are public, enabled, and unauthenticated; e-mail
    /// verification flips `is_authenticated` later.
    ///
    /// # Examples
    ///
    /// ```
    /// use users_org::{User, UserId};
    ///
    /// let id = UserId::parse("alice").unwrap();
    /// let user = User::new(id, "alice@example.org");
    /// assert!(!user.is_authenticated);
    /// assert!(user.is_public);
    /// ```
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        let name = id.as_str().to_owned();
        Self {
            id,
            name,
            email: email.into(),
            telephone: None,
            description: I18nText::new(),
            is_public: true,
            is_disabled: false,
            is_authenticated: false,
            accepted_eula: None,
            created_at: Utc::now(),
        }
    }

    /// The user's identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new(UserId::parse("alice").unwrap(), "alice@example.org");

        assert_eq!(user.id().as_str(), "alice");
        assert_eq!(user.name, "alice");
        assert_eq!(user.email, "alice@example.org");
        assert!(user.is_public);
        assert!(!user.is_disabled);
        assert!(!user.is_authenticated);
        assert!(user.accepted_eula.is_none());
    }
}
