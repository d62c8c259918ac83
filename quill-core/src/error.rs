//! Error types for Quill.
//!
//! Only remote-source failures are ever recovered locally. Everything else is
//! either an expected 404 or a startup defect that should abort initialization.

use thiserror::Error;

/// Result type alias using `QuillError`.
pub type Result<T> = std::result::Result<T, QuillError>;

/// Main error type for all Quill operations.
#[derive(Debug, Error)]
pub enum QuillError {
    // ═══════════════════════════════════════════════════════════════════════════
    // LOOKUP ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// No article is registered under the route.
    #[error("Article not found: {0}")]
    NotFound(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // REMOTE SOURCE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Transport failure talking to the events service (includes timeouts).
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    /// The events service answered with something other than 200.
    #[error("Remote fetch returned unexpected status {status}")]
    RemoteStatus {
        /// HTTP status code received
        status: u16,
    },

    /// The events payload could not be decoded.
    #[error("Remote payload could not be decoded: {0}")]
    RemoteDecode(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // REGISTRATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// An article was registered without a required field.
    #[error("Article '{route}' registered without {field}")]
    MissingMetadata {
        /// Route being registered
        route: String,
        /// Name of the missing field
        field: &'static str,
    },

    /// The route is not an absolute path.
    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    /// Metadata is present but unusable.
    #[error("Invalid article metadata: {0}")]
    InvalidMetadata(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION & SERIALIZATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QuillError {
    /// Returns true if this error came from the remote events service.
    ///
    /// These are the only errors the isolated failure policy swallows.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            QuillError::RemoteFetch(_)
                | QuillError::RemoteStatus { .. }
                | QuillError::RemoteDecode(_)
        )
    }

    /// Returns true if this error is a registration-time defect.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            QuillError::MissingMetadata { .. }
                | QuillError::InvalidRoute(_)
                | QuillError::InvalidMetadata(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuillError::MissingMetadata {
            route: "/warehouse".into(),
            field: "published_at",
        };
        assert!(err.to_string().contains("/warehouse"));
        assert!(err.to_string().contains("published_at"));

        let err = QuillError::RemoteStatus { status: 503 };
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_error_classification() {
        assert!(QuillError::RemoteFetch("timeout".into()).is_remote_failure());
        assert!(QuillError::RemoteStatus { status: 500 }.is_remote_failure());
        assert!(QuillError::RemoteDecode("eof".into()).is_remote_failure());
        assert!(!QuillError::NotFound("/x".into()).is_remote_failure());

        assert!(QuillError::InvalidRoute("x".into()).is_registration_error());
        assert!(!QuillError::Config("x".into()).is_registration_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let quill_result: Result<serde_json::Value> = json_result.map_err(QuillError::from);
        assert!(matches!(quill_result, Err(QuillError::Json(_))));
    }
}
