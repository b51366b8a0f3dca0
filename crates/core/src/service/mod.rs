//! Client facade
//!
//! [`MailUpService`] owns the validated credentials, both credential caches
//! and handles to the transports. Every operation runs its remote calls in
//! sequence and stops at the first failure.

mod gateway;
mod imports;
mod lists;
mod messages;
mod reports;
mod resources;

use std::sync::Arc;

use mailup_common::time::Clock;
use mailup_domain::{ClientConfig, Credentials};

use crate::ports::{ProcedureTransport, ResourceAuthorizer, ResourceTransport, TokenStore};
use crate::session::{CredentialCache, TokenPolicy};

/// Behavioural switches of a [`MailUpService`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Append request/response traces to errors
    pub debug: bool,
    pub procedure_reset_on_use: bool,
    pub resource_reset_on_use: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self { debug: false, procedure_reset_on_use: true, resource_reset_on_use: false }
    }
}

impl From<&ClientConfig> for ServiceSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            debug: config.debug,
            procedure_reset_on_use: config.procedure_reset_on_use,
            resource_reset_on_use: config.resource_reset_on_use,
        }
    }
}

struct ResourceBackend {
    transport: Arc<dyn ResourceTransport>,
    authorizer: Arc<dyn ResourceAuthorizer>,
}

/// High-level MailUp operations over both protocols
pub struct MailUpService {
    credentials: Credentials,
    procedure: Arc<dyn ProcedureTransport>,
    resource: Option<ResourceBackend>,
    access_keys: CredentialCache,
    bearer_tokens: CredentialCache,
    debug: bool,
}

impl MailUpService {
    /// Create a service for one account.
    ///
    /// `store` persists tokens across instances; `None` keeps them in memory
    /// only.
    pub fn new(
        credentials: Credentials,
        procedure: Arc<dyn ProcedureTransport>,
        store: Option<Arc<dyn TokenStore>>,
        clock: Arc<dyn Clock>,
        settings: ServiceSettings,
    ) -> Self {
        let account_key = credentials.store_key();
        let access_keys = CredentialCache::new(
            TokenPolicy::procedure(settings.procedure_reset_on_use),
            &account_key,
            store.clone(),
            Arc::clone(&clock),
        );
        let bearer_tokens = CredentialCache::new(
            TokenPolicy::resource(settings.resource_reset_on_use),
            &account_key,
            store,
            clock,
        );

        Self {
            credentials,
            procedure,
            resource: None,
            access_keys,
            bearer_tokens,
            debug: settings.debug,
        }
    }

    /// Enable the resource-protocol operations.
    #[must_use]
    pub fn with_resource(
        mut self,
        transport: Arc<dyn ResourceTransport>,
        authorizer: Arc<dyn ResourceAuthorizer>,
    ) -> Self {
        self.resource = Some(ResourceBackend { transport, authorizer });
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }
}

#[cfg(test)]
pub(crate) mod testing;
