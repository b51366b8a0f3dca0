//! Error types used throughout the client

use thiserror::Error;

/// Broad classes of failure, used by callers to decide how to react.
///
/// Nothing in the client retries on its own; the category only tells the
/// caller where the failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or invalid constructor parameters
    Configuration,
    /// Network, HTTP or reply-shape failures
    Transport,
    /// The remote service rejected the call with an error code
    RemoteBusiness,
    /// Rejected locally before any remote call
    LocalValidation,
}

/// Main error type for MailUp operations
#[derive(Error, Debug)]
pub enum MailUpError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    /// Non-zero `errorCode` from the send/report services
    #[error("{description}")]
    Remote { code: i64, description: String },

    /// Negative `ReturnCode` from the import service
    #[error("{description}")]
    Import { code: i64, description: String },

    #[error("{0}")]
    Validation(String),

    /// Any of the above, with the request/response trace of the failing call
    /// appended (debug mode only)
    #[error("{source}{trailer}")]
    Diagnosed { source: Box<MailUpError>, trailer: String },
}

impl MailUpError {
    /// Shorthand for a local validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Attach a diagnostic trailer. An empty trailer leaves the error as is.
    #[must_use]
    pub fn with_diagnostics(self, trailer: impl Into<String>) -> Self {
        let trailer = trailer.into();
        if trailer.is_empty() {
            return self;
        }
        match self {
            Self::Diagnosed { source, trailer: existing } => {
                Self::Diagnosed { source, trailer: format!("{existing}{trailer}") }
            }
            other => Self::Diagnosed { source: Box::new(other), trailer },
        }
    }

    /// The error without any diagnostic wrapper.
    pub fn root(&self) -> &Self {
        match self {
            Self::Diagnosed { source, .. } => source.root(),
            other => other,
        }
    }

    /// The diagnostic trailer, if one was attached.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::Diagnosed { trailer, .. } => Some(trailer),
            _ => None,
        }
    }

    /// Numeric code reported by the remote side (HTTP status for resource
    /// calls).
    pub fn code(&self) -> Option<i64> {
        match self.root() {
            Self::Remote { code, .. } | Self::Import { code, .. } => Some(*code),
            Self::Http { status, .. } => Some(i64::from(*status)),
            Self::Unauthorized(_) => Some(401),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self.root() {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Transport(_)
            | Self::Unauthorized(_)
            | Self::NotFound(_)
            | Self::Http { .. }
            | Self::MalformedReply(_) => ErrorCategory::Transport,
            Self::Remote { .. } | Self::Import { .. } => ErrorCategory::RemoteBusiness,
            Self::Validation(_) => ErrorCategory::LocalValidation,
            Self::Diagnosed { source, .. } => source.category(),
        }
    }
}

/// Result type alias for MailUp operations
pub type Result<T> = std::result::Result<T, MailUpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_display_only_their_description() {
        let err = MailUpError::Import { code: -303, description: "The group already exists.".into() };
        assert_eq!(err.to_string(), "The group already exists.");
        assert_eq!(err.code(), Some(-303));
        assert_eq!(err.category(), ErrorCategory::RemoteBusiness);
    }

    #[test]
    fn diagnostics_are_appended_and_transparent_to_classification() {
        let err = MailUpError::Remote { code: 7, description: "Bad list".into() }
            .with_diagnostics("\n\nRequest body:\n<x/>");

        assert_eq!(err.to_string(), "Bad list\n\nRequest body:\n<x/>");
        assert_eq!(err.code(), Some(7));
        assert_eq!(err.category(), ErrorCategory::RemoteBusiness);
        assert!(matches!(err.root(), MailUpError::Remote { code: 7, .. }));
        assert_eq!(err.diagnostics(), Some("\n\nRequest body:\n<x/>"));
    }

    #[test]
    fn empty_trailer_is_ignored() {
        let err = MailUpError::validation("No data to send").with_diagnostics("");
        assert!(matches!(err, MailUpError::Validation(_)));
        assert_eq!(err.diagnostics(), None);
    }

    #[test]
    fn http_status_doubles_as_code() {
        assert_eq!(MailUpError::Unauthorized("x".into()).code(), Some(401));
        assert_eq!(MailUpError::NotFound("x".into()).code(), Some(404));
        assert_eq!(MailUpError::Http { status: 503, message: "x".into() }.code(), Some(503));
        assert_eq!(MailUpError::Config("x".into()).category(), ErrorCategory::Configuration);
    }
}
