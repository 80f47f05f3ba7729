//! # Validation Error
//!
//! The single error type crossing every boundary of conform.
//!
//! ## Design
//!
//! - `code` is the root prefix or a dotted/bracketed descendant of it,
//!   derived purely from structural position.
//! - `message` is human-readable and carries the offending value or bound.
//! - `cause` optionally keeps the underlying error (a regex build failure,
//!   a collaborator's lookup error) reachable through `source()`.
//!
//! Errors are constructed at the point of failure and propagated unchanged.
//! Nothing in the workspace re-wraps or renames a `ValidationError`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error used as the optional cause of a [`ValidationError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A path-addressed validation failure.
#[derive(Error, Debug)]
#[error("{code}: {message}")]
pub struct ValidationError {
    code: String,
    message: String,
    #[source]
    cause: Option<BoxError>,
}

impl ValidationError {
    /// Create an error at `code` with a human-readable message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Create an error at `code` that keeps `cause` as its source.
    pub fn with_cause(
        code: impl Into<String>,
        message: impl Into<String>,
        cause: impl Into<BoxError>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    /// The fully-qualified error code, e.g. `profile.norms[2].attribute`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying cause, if one was attached.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// The code relative to `root`, without the leading separator.
    ///
    /// Returns `None` when the error is addressed at `root` itself or when
    /// the code does not descend from `root`.
    pub fn field_path(&self, root: &str) -> Option<&str> {
        let rest = self.code.strip_prefix(root)?;
        let rest = if root.is_empty() || rest.starts_with('[') {
            rest
        } else {
            rest.strip_prefix('.')?
        };
        (!rest.is_empty()).then_some(rest)
    }
}

// ─── Response Body ───────────────────────────────────────────────────

/// Serializable projection of a [`ValidationError`] for response formatters.
///
/// `field` is the error code relative to the root prefix of the request, so
/// a formatter can point the caller at `norms[2].attribute` without knowing
/// which prefix the server used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Fully-qualified error code.
    pub code: String,
    /// Field path relative to the root prefix, absent for root-level errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Human-readable message.
    pub message: String,
}

impl ErrorBody {
    /// Project `error` relative to the root prefix `root`.
    pub fn new(error: &ValidationError, root: &str) -> Self {
        Self {
            code: error.code().to_string(),
            field: error.field_path(root).map(str::to_string),
            message: error.message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_includes_code_and_message() {
        let err = ValidationError::new("profile.name", "must not be blank, got 'null'");
        assert_eq!(err.to_string(), "profile.name: must not be blank, got 'null'");
    }

    #[test]
    fn test_cause_is_exposed_as_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "lookup down");
        let err = ValidationError::with_cause("profile.ownerId", "not found", io);
        assert!(err.source().is_some());
        assert_eq!(err.cause().map(|c| c.to_string()).as_deref(), Some("lookup down"));
    }

    #[test]
    fn test_field_path_strips_root() {
        let err = ValidationError::new("profile.norms[2].attribute", "bad");
        assert_eq!(err.field_path("profile"), Some("norms[2].attribute"));
    }

    #[test]
    fn test_field_path_root_level_error() {
        let err = ValidationError::new("profile", "bad");
        assert_eq!(err.field_path("profile"), None);
    }

    #[test]
    fn test_field_path_element_of_root() {
        let err = ValidationError::new("tags[3]", "duplicate");
        assert_eq!(err.field_path("tags"), Some("[3]"));
    }

    #[test]
    fn test_field_path_foreign_root() {
        let err = ValidationError::new("user.name", "bad");
        assert_eq!(err.field_path("profile"), None);
    }

    #[test]
    fn test_error_body_serialization() {
        let err = ValidationError::new("profile.norms[0].value", "value 11 exceeds maximum 10");
        let body = ErrorBody::new(&err, "profile");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": "profile.norms[0].value",
                "field": "norms[0].value",
                "message": "value 11 exceeds maximum 10",
            })
        );
    }

    #[test]
    fn test_error_body_omits_root_field() {
        let err = ValidationError::new("profile", "expected object, got array");
        let json = serde_json::to_value(ErrorBody::new(&err, "profile")).unwrap();
        assert!(json.get("field").is_none());
    }
}
