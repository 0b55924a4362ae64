//! Error types for authentication operations

use thiserror::Error;

/// Authentication error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Login or password did not match
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The account exists but is disabled
    #[error("Account is disabled")]
    AccountDisabled,

    /// The account's e-mail address has not been verified yet
    #[error("E-mail address not verified")]
    NotVerified,

    /// The session token is unknown or has expired
    #[error("Session invalidated")]
    SessionInvalidated,

    /// The verification token is unknown or already used
    #[error("Unknown verification token")]
    UnknownVerificationToken,

    /// A field failed validation before authentication was attempted
    #[error("Invalid {property}: {description}")]
    Validation {
        /// The offending field
        property: String,
        /// Human-readable description
        description: String,
    },
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Create a field-level validation error.
    pub fn validation(property: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Validation {
            property: property.into(),
            description: description.into(),
        }
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials
            | AuthError::SessionInvalidated
            | AuthError::NotVerified => 401,
            AuthError::AccountDisabled => 403,
            AuthError::UnknownVerificationToken => 404,
            AuthError::Validation { .. } => 400,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::AccountDisabled => "ACCOUNT_DISABLED",
            AuthError::NotVerified => "NOT_VERIFIED",
            AuthError::SessionInvalidated => "SESSION_INVALIDATED",
            AuthError::UnknownVerificationToken => "UNKNOWN_VERIFICATION_TOKEN",
            AuthError::Validation { .. } => "VALIDATION_ERROR",
        }
    }
}
