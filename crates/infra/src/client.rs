//! Ready-to-use client
//!
//! [`MailUpClient`] wires the HTTP transports, the file token store and the
//! system clock into a [`MailUpService`]. It dereferences to the service, so
//! every operation is called on the client directly.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;

use mailup_common::SystemClock;
use mailup_core::{MailUpService, ServiceSettings, TokenStore};
use mailup_domain::{ClientConfig, Credentials, Result};
use tracing::info;

use crate::config;
use crate::http::HttpClient;
use crate::procedure::{HttpProcedureTransport, ServiceRegistry};
use crate::resource::{HttpResourceTransport, PasswordGrantAuthorizer, ResourceEndpoints};
use crate::token_store::FileTokenStore;

const USER_AGENT: &str = concat!("mailup-client/", env!("CARGO_PKG_VERSION"));

/// MailUp client over HTTP
pub struct MailUpClient {
    service: MailUpService,
}

impl MailUpClient {
    /// Build a client from `config`.
    ///
    /// The resource protocol is enabled only when both a client id and a
    /// client secret are configured. Tokens persist across instances when
    /// `cache_dir` names a writable directory.
    ///
    /// # Errors
    /// Returns `MailUpError::Config` for invalid credentials or HTTP settings.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let credentials = Credentials::from_config(config)?;
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        let registry = ServiceRegistry::standard(
            &credentials,
            config.services_url.as_deref(),
            config.import_url.as_deref(),
        );
        let procedure = HttpProcedureTransport::new(http.clone(), registry).with_tracing(config.debug);

        let store = config
            .cache_dir
            .as_deref()
            .and_then(FileTokenStore::open)
            .map(|store| Arc::new(store) as Arc<dyn TokenStore>);

        let has_resource = credentials.resource_client().is_some();
        let mut service = MailUpService::new(
            credentials,
            Arc::new(procedure),
            store,
            Arc::new(SystemClock),
            ServiceSettings::from(config),
        );

        if has_resource {
            let endpoints = ResourceEndpoints::under(config.services_url.as_deref());
            let authorizer = PasswordGrantAuthorizer::new(http.clone(), endpoints.token.clone());
            service = service.with_resource(
                Arc::new(HttpResourceTransport::new(http, endpoints)),
                Arc::new(authorizer),
            );
        }

        info!(
            username = service.credentials().username(),
            resource = has_resource,
            debug = config.debug,
            "MailUp client ready"
        );
        Ok(Self { service })
    }

    /// Build a client from the environment or the first config file found.
    ///
    /// # Errors
    /// See [`config::load`] and [`MailUpClient::new`].
    pub fn from_default_config() -> Result<Self> {
        Self::new(&config::load()?)
    }

    pub fn into_service(self) -> MailUpService {
        self.service
    }
}

impl Deref for MailUpClient {
    type Target = MailUpService;

    fn deref(&self) -> &Self::Target {
        &self.service
    }
}

impl DerefMut for MailUpClient {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.service
    }
}

#[cfg(test)]
mod tests {
    use mailup_common::testing::TempDir;
    use mailup_domain::MailUpError;

    use super::*;

    #[test]
    fn invalid_credentials_fail_at_construction() {
        let config = ClientConfig::new("", "pw", "https://console.example.com/");
        assert!(matches!(MailUpClient::new(&config), Err(MailUpError::Config(_))));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = ClientConfig::new("a1234", "pw", "https://console.example.com/");
        config.timeout_secs = 0;
        assert!(matches!(MailUpClient::new(&config), Err(MailUpError::Config(_))));
    }

    #[test]
    fn unusable_cache_dir_is_ignored() {
        let temp = TempDir::new("client").unwrap();
        let mut config = ClientConfig::new("a1234", "pw", "https://console.example.com/");
        config.cache_dir = Some(temp.path().join("missing"));

        let client = MailUpClient::new(&config).unwrap();
        assert_eq!(client.credentials().console_id(), 1234);
    }

    #[test]
    fn resource_operations_need_client_registration() {
        let config = ClientConfig::new("a1234", "pw", "https://console.example.com/");
        let mut client = MailUpClient::new(&config).unwrap();

        let err = client.message_statistics(8).unwrap_err();
        assert!(matches!(err, MailUpError::Config(_)));
    }
}
