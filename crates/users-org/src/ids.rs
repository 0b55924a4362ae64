//! Entity identifiers
//!
//! This module provides the string-backed identifier types used throughout
//! the users service. Identifiers keep their original spelling for display
//! but compare, order, and hash case-insensitively, so `"ACME"` and
//! `"acme"` name the same entity.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::IdError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(String);

        impl $name {
            /// Parse an identifier from text.
            ///
            /// The input is trimmed; parsing fails when nothing remains.
            ///
            /// # Examples
            ///
            /// ```
            #[doc = concat!("use users_org::ids::", stringify!($name), ";")]
            ///
            #[doc = concat!("let id = ", stringify!($name), "::parse(\"  acme \").unwrap();")]
            /// assert_eq!(id.as_str(), "acme");
            #[doc = concat!("assert!(", stringify!($name), "::parse(\"   \").is_err());")]
            /// ```
            pub fn parse(text: &str) -> Result<Self, IdError> {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(IdError::Blank);
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Parse an identifier, returning `None` instead of an error.
            pub fn try_parse(text: &str) -> Option<Self> {
                Self::parse(text).ok()
            }

            /// Generate a random alphanumeric identifier of the given length.
            ///
            /// Not cryptographically strong; intended for default and test
            /// identifiers only, never for security tokens.
            pub fn random(length: usize) -> Self {
                let text: String = rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(length.max(1))
                    .map(char::from)
                    .collect();
                Self(text)
            }

            /// The identifier text in its original spelling.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Length of the identifier text in characters.
            pub fn len(&self) -> usize {
                self.0.chars().count()
            }

            /// Always `false`; identifiers cannot be empty after construction.
            pub fn is_empty(&self) -> bool {
                false
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        // Equality, ordering and hashing are case-insensitive on the
        // lower-cased form. Display keeps the original spelling.
        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.0.to_lowercase() == other.0.to_lowercase()
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.to_lowercase().hash(state);
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.to_lowercase().cmp(&other.0.to_lowercase())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                Self::parse(&text).map_err(serde::de::Error::custom)
            }
        }
    };
}

string_id! {
    /// Unique identifier of an organization.
    OrganizationId
}

string_id! {
    /// Unique identifier of a user account (the login name).
    UserId
}

string_id! {
    /// Unique identifier of a user group.
    GroupId
}
