//! Port interfaces for the remote protocols and token persistence
//!
//! These traits define the boundaries between the client logic and the
//! infrastructure implementations. Everything is blocking.

use std::fmt;

use mailup_domain::{ResourceClient, Result};
use serde_json::Value;

/// Procedure-protocol services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceName {
    Send,
    Report,
    Import,
}

impl ServiceName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Send => "MailUpSend",
            Self::Report => "MailUpReport",
            Self::Import => "MailUpImport",
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Authentication` header carried by import-service calls
#[derive(Clone, PartialEq, Eq)]
pub struct AuthenticationHeader {
    pub user: String,
    pub password: String,
    pub enc_type: String,
}

impl AuthenticationHeader {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self { user: user.into(), password: password.into(), enc_type: "UTF-8".to_string() }
    }
}

impl fmt::Debug for AuthenticationHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationHeader")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("enc_type", &self.enc_type)
            .finish()
    }
}

/// Raw headers and bodies of the last call made to one service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeTrace {
    pub request_headers: String,
    pub request_body: String,
    pub response_headers: String,
    pub response_body: String,
}

impl ExchangeTrace {
    /// Text appended to error messages in debug mode.
    pub fn trailer(&self) -> String {
        format!(
            "\n\nRequest headers:\n{}\n\nRequest body:\n{}\n\nResponse headers:\n{}\n\nResponse body:\n{}",
            self.request_headers, self.request_body, self.response_headers, self.response_body
        )
    }
}

/// Executes named procedures against a service description
pub trait ProcedureTransport: Send + Sync {
    /// Call `method` on `service` and return the decoded reply document.
    ///
    /// Scalar arguments are rendered as text in the given order. The reply is
    /// the tree of the XML document embedded in the `{method}Result` field:
    /// attributes under `@attributes`, repeated children as arrays, leaves as
    /// strings.
    fn invoke(
        &self,
        service: ServiceName,
        method: &str,
        args: &[(&str, Value)],
        header: Option<&AuthenticationHeader>,
    ) -> Result<Value>;

    /// Trace of the last call to `service`, when tracing is enabled.
    fn last_exchange(&self, service: ServiceName) -> Option<ExchangeTrace>;
}

/// Versioned resource-protocol endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceEndpoint {
    Console,
    MailStatistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// Executes JSON calls against the resource endpoints
pub trait ResourceTransport: Send + Sync {
    /// Send `body` (if any) and decode the JSON reply.
    ///
    /// # Errors
    /// 401 maps to `MailUpError::Unauthorized`, 404 to `NotFound`, other
    /// non-2xx statuses to `Http`; an undecodable body to `MalformedReply`.
    fn request(
        &self,
        endpoint: ResourceEndpoint,
        path: &str,
        verb: HttpVerb,
        body: Option<&Value>,
        bearer: &str,
    ) -> Result<Value>;
}

/// Performs the resource-protocol credential exchange
pub trait ResourceAuthorizer: Send + Sync {
    /// OAuth password grant; returns the bearer token.
    fn password_grant(
        &self,
        client: &ResourceClient,
        username: &str,
        password: &str,
    ) -> Result<String>;
}

/// Access token together with the time it was obtained (or last used)
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub value: String,
    /// Seconds since the UNIX epoch
    pub obtained_at: i64,
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("value", &"<redacted>")
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// Key-value persistence for cached tokens
///
/// Implementations report failures, but the credential cache never treats
/// them as fatal.
pub trait TokenStore: Send + Sync {
    /// `Ok(None)` when nothing is stored under `key`; `Err` when a record
    /// exists but cannot be read.
    fn load(&self, key: &str) -> Result<Option<CachedToken>>;

    fn save(&self, key: &str, token: &CachedToken) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    fn contains(&self, key: &str) -> bool;
}
