//! # Users Platform Authentication
//!
//! This crate provides sign-in for the Social Open Data users service:
//! salted password records, security-token sessions, the session cookie
//! codec, and single-use e-mail verification tokens.
//!
//! ## Overview
//!
//! The users-auth crate handles:
//! - **Passwords**: Salted SHA-256 login/password records per realm
//! - **Sessions**: Opaque security tokens with a bounded lifetime
//! - **Cookies**: The `SocialOpenData` session cookie format
//! - **Verification tokens**: Single-use e-mail verification
//!
//! ## Usage
//!
//! ```rust
//! use users_auth::{LoginPassword, SecurityToken};
//! use users_org::UserId;
//!
//! let login = UserId::parse("alice").unwrap();
//! let record = LoginPassword::new(login, "correct horse battery", None);
//! assert!(record.verify("correct horse battery"));
//! assert!(!record.verify("wrong"));
//!
//! let token = SecurityToken::random();
//! assert_eq!(token.as_str().len(), 40);
//! ```

pub mod cookie;
pub mod error;
pub mod password;
pub mod session;
pub mod token;

// Re-export main types for convenience
pub use cookie::{expired_session_cookie, parse_session_cookie, session_cookie, COOKIE_NAME};
pub use error::{AuthError, AuthResult};
pub use password::LoginPassword;
pub use session::{SecurityToken, SessionStore, SignInSession};
pub use token::{VerificationToken, VerificationTokenStore};
