//! Client configuration and validated credentials

use std::fmt;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TIMEOUT_SECS;
use crate::{MailUpError, Result};

static URL_SCHEME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)https?://(.*)").expect("URL_SCHEME should compile - this is a bug")
});
static URL_HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^/]*)/").expect("URL_HOST should compile - this is a bug"));
static CONSOLE_USERNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^a(\d+)$").expect("CONSOLE_USERNAME should compile - this is a bug")
});

/// Client configuration, as loaded from the environment or a config file
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub username: String,
    pub password: String,
    /// Console address; scheme and path are stripped during validation
    pub console_url: String,
    /// Numeric console id; derived from an `aNNN` username when absent
    #[serde(default)]
    pub console_id: Option<u64>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Directory for persisted access tokens; ignored unless it is a
    /// writable directory
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub debug: bool,
    /// Base URL of the send/report services, REST endpoints and token
    /// endpoint
    #[serde(default)]
    pub services_url: Option<String>,
    /// Import service endpoint; defaults to the console host
    #[serde(default)]
    pub import_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_true")]
    pub procedure_reset_on_use: bool,
    #[serde(default)]
    pub resource_reset_on_use: bool,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

impl ClientConfig {
    /// Minimal configuration with every optional setting at its default.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        console_url: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            console_url: console_url.into(),
            console_id: None,
            client_id: None,
            client_secret: None,
            cache_dir: None,
            debug: false,
            services_url: None,
            import_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            procedure_reset_on_use: true,
            resource_reset_on_use: false,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("console_url", &self.console_url)
            .field("console_id", &self.console_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("cache_dir", &self.cache_dir)
            .field("debug", &self.debug)
            .field("services_url", &self.services_url)
            .field("import_url", &self.import_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("procedure_reset_on_use", &self.procedure_reset_on_use)
            .field("resource_reset_on_use", &self.resource_reset_on_use)
            .finish()
    }
}

/// OAuth client registration used by the resource protocol
#[derive(Clone, PartialEq, Eq)]
pub struct ResourceClient {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Validated account credentials. Immutable after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
    console_host: String,
    console_id: u64,
    resource_client: Option<ResourceClient>,
}

impl Credentials {
    /// Validate raw credentials.
    ///
    /// # Errors
    /// Returns `MailUpError::Config` when the username, password or console
    /// url is empty, the url has no host, or no positive console id is given
    /// and none can be derived from the username.
    pub fn new(
        username: &str,
        password: &str,
        console_url: &str,
        console_id: Option<u64>,
    ) -> Result<Self> {
        if username.is_empty() {
            return Err(MailUpError::Config("Missing username parameter".into()));
        }
        if password.is_empty() {
            return Err(MailUpError::Config("Missing password parameter".into()));
        }
        if console_url.is_empty() {
            return Err(MailUpError::Config("Missing consoleUrl parameter".into()));
        }

        let console_host = extract_host(console_url)
            .ok_or_else(|| MailUpError::Config("Invalid consoleUrl parameter".into()))?;

        let console_id = match console_id {
            Some(0) => return Err(MailUpError::Config("Invalid consoleId parameter".into())),
            Some(id) => id,
            None => derive_console_id(username)
                .ok_or_else(|| MailUpError::Config("Unable to determine consoleId".into()))?,
        };

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
            console_host,
            console_id,
            resource_client: None,
        })
    }

    /// Validate the credential part of a [`ClientConfig`].
    ///
    /// A client id without a secret (or the reverse) is a configuration
    /// error; neither means the resource protocol is unavailable.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let credentials = Self::new(
            &config.username,
            &config.password,
            &config.console_url,
            config.console_id,
        )?;

        let client_id = config.client_id.as_deref().filter(|s| !s.is_empty());
        let client_secret = config.client_secret.as_deref().filter(|s| !s.is_empty());
        match (client_id, client_secret) {
            (Some(id), Some(secret)) => Ok(credentials.with_resource_client(id, secret)),
            (None, None) => Ok(credentials),
            (Some(_), None) => Err(MailUpError::Config("Missing clientSecret parameter".into())),
            (None, Some(_)) => Err(MailUpError::Config("Missing clientId parameter".into())),
        }
    }

    /// Attach the OAuth client registration for the resource protocol.
    #[must_use]
    pub fn with_resource_client(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.resource_client =
            Some(ResourceClient { client_id: client_id.into(), client_secret: client_secret.into() });
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Bare console host, without scheme or path.
    pub fn console_host(&self) -> &str {
        &self.console_host
    }

    pub fn console_id(&self) -> u64 {
        self.console_id
    }

    pub fn resource_client(&self) -> Option<&ResourceClient> {
        self.resource_client.as_ref()
    }

    /// Username reduced to `[A-Za-z0-9_]`, used to key persisted tokens.
    pub fn store_key(&self) -> String {
        self.username.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_').collect()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("console_host", &self.console_host)
            .field("console_id", &self.console_id)
            .field("resource_client", &self.resource_client)
            .finish()
    }
}

fn extract_host(console_url: &str) -> Option<String> {
    let mut rest = console_url.trim();
    if let Some(caps) = URL_SCHEME.captures(rest) {
        rest = caps.get(1).map_or("", |m| m.as_str());
    }
    if let Some(caps) = URL_HOST.captures(rest) {
        rest = caps.get(1).map_or("", |m| m.as_str());
    }
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

fn derive_console_id(username: &str) -> Option<u64> {
    CONSOLE_USERNAME
        .captures(username)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_url_is_reduced_to_host() {
        let creds = Credentials::new("a1234", "pw", "https://a1b2.s22.it/frontend/", None).unwrap();
        assert_eq!(creds.console_host(), "a1b2.s22.it");

        let creds = Credentials::new("a1234", "pw", "HTTP://console.example.com", None).unwrap();
        assert_eq!(creds.console_host(), "console.example.com");

        let creds = Credentials::new("a1234", "pw", "console.example.com/path", None).unwrap();
        assert_eq!(creds.console_host(), "console.example.com");
    }

    #[test]
    fn console_id_is_derived_from_username() {
        let creds = Credentials::new("a98765", "pw", "console.example.com", None).unwrap();
        assert_eq!(creds.console_id(), 98765);
    }

    #[test]
    fn explicit_console_id_wins() {
        let creds = Credentials::new("a98765", "pw", "console.example.com", Some(12)).unwrap();
        assert_eq!(creds.console_id(), 12);
    }

    #[test]
    fn rejects_missing_or_invalid_parameters() {
        let cases = [
            Credentials::new("", "pw", "console.example.com", Some(1)),
            Credentials::new("user", "", "console.example.com", Some(1)),
            Credentials::new("user", "pw", "", Some(1)),
            Credentials::new("user", "pw", "https:///", Some(1)),
            Credentials::new("user", "pw", "console.example.com", Some(0)),
            Credentials::new("user", "pw", "console.example.com", None),
            Credentials::new("a0", "pw", "console.example.com", None),
        ];

        for result in cases {
            assert!(matches!(result, Err(MailUpError::Config(_))), "{result:?}");
        }
    }

    #[test]
    fn store_key_keeps_word_characters_only() {
        let creds = Credentials::new("john.doe@example.com", "pw", "c.example.com", Some(3)).unwrap();
        assert_eq!(creds.store_key(), "johndoeexamplecom");
    }

    #[test]
    fn from_config_requires_both_client_id_and_secret() {
        let mut config = ClientConfig::new("a1", "pw", "console.example.com");
        assert!(Credentials::from_config(&config).unwrap().resource_client().is_none());

        config.client_id = Some("id".into());
        assert!(matches!(Credentials::from_config(&config), Err(MailUpError::Config(_))));

        config.client_secret = Some("secret".into());
        let creds = Credentials::from_config(&config).unwrap();
        assert_eq!(creds.resource_client().map(|c| c.client_id.as_str()), Some("id"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = ClientConfig::new("a1", "hunter2", "console.example.com");
        config.client_secret = Some("s3cret".into());
        let creds = Credentials::from_config(&ClientConfig {
            client_id: Some("id".into()),
            ..config.clone()
        })
        .unwrap();

        for rendered in [format!("{config:?}"), format!("{creds:?}")] {
            assert!(!rendered.contains("hunter2"));
            assert!(!rendered.contains("s3cret"));
        }
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            username = "a42"
            password = "pw"
            console_url = "https://console.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.timeout_secs, 30);
        assert!(config.procedure_reset_on_use);
        assert!(!config.resource_reset_on_use);
        assert!(!config.debug);
        assert!(config.cache_dir.is_none());
    }
}
