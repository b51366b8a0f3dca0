//! Conversions from external infrastructure errors into domain errors.

use std::io::{Error as IoError, ErrorKind};

use mailup_domain::MailUpError;
use quick_xml::Error as XmlError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub MailUpError);

impl From<InfraError> for MailUpError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<MailUpError> for InfraError {
    fn from(value: MailUpError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoMailUpError {
    fn into_mailup(self) -> MailUpError;
}

/// Map any supported infrastructure error straight into the domain error.
pub fn infra<E>(err: E) -> MailUpError
where
    InfraError: From<E>,
{
    InfraError::from(err).into()
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → MailUpError */
/* -------------------------------------------------------------------------- */

impl IntoMailUpError for HttpError {
    fn into_mailup(self) -> MailUpError {
        if self.is_timeout() {
            return MailUpError::Transport("HTTP request timed out".into());
        }

        if self.is_connect() {
            return MailUpError::Transport("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 => MailUpError::Unauthorized(message),
                404 => MailUpError::NotFound(message),
                _ => MailUpError::Http { status: code, message },
            };
        }

        if self.is_decode() {
            return MailUpError::MalformedReply(format!("Undecodable HTTP body: {self}"));
        }

        MailUpError::Transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_mailup())
    }
}

/* -------------------------------------------------------------------------- */
/* quick_xml::Error → MailUpError */
/* -------------------------------------------------------------------------- */

impl IntoMailUpError for XmlError {
    fn into_mailup(self) -> MailUpError {
        match self {
            XmlError::Io(err) => MailUpError::Transport(format!("XML I/O failure: {err}")),
            other => MailUpError::MalformedReply(format!("Invalid XML: {other}")),
        }
    }
}

impl From<XmlError> for InfraError {
    fn from(value: XmlError) -> Self {
        Self(value.into_mailup())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → MailUpError */
/* -------------------------------------------------------------------------- */

impl IntoMailUpError for IoError {
    fn into_mailup(self) -> MailUpError {
        match self.kind() {
            ErrorKind::NotFound => MailUpError::NotFound(format!("file not found: {self}")),
            ErrorKind::PermissionDenied => {
                MailUpError::Config(format!("permission denied: {self}"))
            }
            _ => MailUpError::Transport(format!("I/O failure: {self}")),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        Self(value.into_mailup())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → MailUpError */
/* -------------------------------------------------------------------------- */

impl IntoMailUpError for JsonError {
    fn into_mailup(self) -> MailUpError {
        MailUpError::MalformedReply(format!(
            "Invalid JSON at line {} column {}: {self}",
            self.line(),
            self.column()
        ))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        Self(value.into_mailup())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
