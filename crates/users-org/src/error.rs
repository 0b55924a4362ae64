//! Error types for the organization domain model
//!
//! This module defines the error values returned by identifier parsing,
//! graph lookups, and the JSON codec. All of them are plain values; the
//! domain layer never panics on bad input.

use thiserror::Error;

use crate::ids::OrganizationId;

/// Identifier parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// Input was empty or whitespace-only after trimming
    #[error("identifier must not be blank")]
    Blank,
}

/// Graph lookup and projection errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The requested organization is not present in the graph
    #[error("unknown organization: {0}")]
    UnknownOrganization(OrganizationId),
}

/// JSON parse failure with an optional offending property.
///
/// Mirrors the wire-level error body: every failure carries a
/// human-readable description, and field-level failures name the property
/// so clients can highlight the right input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{description}")]
pub struct ParseError {
    /// The JSON property that failed validation, if the failure is field-level
    pub property: Option<String>,

    /// Human-readable description of the failure
    pub description: String,
}

impl ParseError {
    /// Create a field-level parse error.
    pub fn on(property: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            property: Some(property.into()),
            description: description.into(),
        }
    }

    /// Create a document-level parse error with no associated property.
    pub fn msg(description: impl Into<String>) -> Self {
        Self {
            property: None,
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::on("email", "Invalid e-mail address!");
        assert_eq!(err.to_string(), "Invalid e-mail address!");
        assert_eq!(err.property.as_deref(), Some("email"));

        let err = ParseError::msg("Invalid JSON document!");
        assert!(err.property.is_none());
    }
}
