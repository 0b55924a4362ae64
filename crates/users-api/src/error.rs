//! HTTP error surface
//!
//! Every failure path renders a machine-readable JSON body with a
//! `description` and, for field-level failures, the offending `property`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use users_auth::AuthError;
use users_org::{GraphError, ParseError};

/// Service-level error with an HTTP mapping.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Request field failed validation (400)
    #[error("{description}")]
    Validation {
        /// The offending field, when known
        property: Option<String>,
        /// Human-readable description
        description: String,
    },

    /// Entity not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Conflicting state, e.g. a duplicate login (409)
    #[error("{0}")]
    Conflict(String),

    /// Authentication failed (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Disabled account or missing rights (403)
    #[error("{0}")]
    Forbidden(String),

    /// Unsupported method on this path (405)
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Anything unexpected (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Create a field-level validation error.
    pub fn validation(property: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Validation {
            property: Some(property.into()),
            description: description.into(),
        }
    }

    /// Create a document-level validation error.
    pub fn bad_request(description: impl Into<String>) -> Self {
        Self::Validation {
            property: None,
            description: description.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Wire form of an error.
#[derive(Debug, Serialize)]
struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    property: Option<String>,
    description: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self, ApiError::Internal(_)) {
            tracing::error!(error = %self, "internal error");
        }
        let body = match &self {
            ApiError::Validation {
                property,
                description,
            } => ErrorBody {
                property: property.clone(),
                description: description.clone(),
            },
            other => ErrorBody {
                property: None,
                description: other.to_string(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        ApiError::Validation {
            property: err.property,
            description: err.description,
        }
    }
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        ApiError::NotFound(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation {
                property,
                description,
            } => ApiError::Validation {
                property: Some(property),
                description,
            },
            AuthError::AccountDisabled => ApiError::Forbidden(err.to_string()),
            AuthError::UnknownVerificationToken => ApiError::NotFound(err.to_string()),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

/// Result type for request handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::validation("email", "bad").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_auth_error_conversion() {
        let err: ApiError = AuthError::InvalidCredentials.into();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err: ApiError = AuthError::validation("password", "too short").into();
        match err {
            ApiError::Validation { property, .. } => {
                assert_eq!(property.as_deref(), Some("password"))
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
