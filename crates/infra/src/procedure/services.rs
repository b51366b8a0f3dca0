//! Service descriptions for the procedure protocol
//!
//! Each service is reached at one endpoint and qualifies its operations with
//! one XML namespace. The import service lives on the console host; the
//! others share the platform services host.

use std::collections::HashMap;

use mailup_core::ServiceName;
use mailup_domain::constants::DEFAULT_SERVICES_URL;
use mailup_domain::{Credentials, MailUpError, Result};

/// Namespace of the send, report and manage services
pub const SERVICES_NAMESPACE: &str = "http://services.mailupnet.it/";

/// Namespace of the import service and of its `Authentication` header
pub const IMPORT_NAMESPACE: &str = "http://ws.mailupnet.it/";

/// Endpoint and namespace of one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescription {
    pub url: String,
    pub namespace: String,
}

impl ServiceDescription {
    pub fn new(url: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self { url: url.into(), namespace: namespace.into() }
    }

    /// `SOAPAction` header value for `method`.
    pub fn action(&self, method: &str) -> String {
        format!("{}{method}", self.namespace)
    }
}

/// Lookup table from [`ServiceName`] to [`ServiceDescription`]
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: HashMap<ServiceName, ServiceDescription>,
}

impl ServiceRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard endpoints for an account.
    ///
    /// `services_url` defaults to the public platform host; `import_url`
    /// defaults to the import endpoint on the console host.
    pub fn standard(
        credentials: &Credentials,
        services_url: Option<&str>,
        import_url: Option<&str>,
    ) -> Self {
        let base = services_url.unwrap_or(DEFAULT_SERVICES_URL).trim_end_matches('/');
        let import = import_url.map_or_else(
            || format!("https://{}/Services/WSMailUpImport.asmx", credentials.console_host()),
            str::to_string,
        );

        Self::new()
            .with(ServiceName::Send, ServiceDescription::new(format!("{base}/Services/MailUpSend.asmx"), SERVICES_NAMESPACE))
            .with(ServiceName::Report, ServiceDescription::new(format!("{base}/Services/MailUpReport.asmx"), SERVICES_NAMESPACE))
            .with(ServiceName::Import, ServiceDescription::new(import, IMPORT_NAMESPACE))
    }

    #[must_use]
    pub fn with(mut self, service: ServiceName, description: ServiceDescription) -> Self {
        self.services.insert(service, description);
        self
    }

    /// # Errors
    /// `Transport` when no description was registered for `service`.
    pub fn get(&self, service: ServiceName) -> Result<&ServiceDescription> {
        self.services.get(&service).ok_or_else(|| {
            MailUpError::Transport(format!("Unable to find the service description for {service}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("a1234", "secret", "http://c1.example.com/frontend", None).unwrap()
    }

    #[test]
    fn import_service_is_bound_to_console_host() {
        let registry = ServiceRegistry::standard(&credentials(), None, None);
        let import = registry.get(ServiceName::Import).unwrap();

        assert_eq!(import.url, "https://c1.example.com/Services/WSMailUpImport.asmx");
        assert_eq!(import.action("GetNlLists"), "http://ws.mailupnet.it/GetNlLists");
    }

    #[test]
    fn services_url_override_drops_trailing_slash() {
        let registry = ServiceRegistry::standard(&credentials(), Some("http://127.0.0.1:9000/"), None);
        assert_eq!(
            registry.get(ServiceName::Send).unwrap().url,
            "http://127.0.0.1:9000/Services/MailUpSend.asmx"
        );
    }

    #[test]
    fn missing_description_is_transport_error() {
        let err = ServiceRegistry::new().get(ServiceName::Report).unwrap_err();
        assert!(matches!(err, MailUpError::Transport(_)));
        assert!(err.to_string().contains("MailUpReport"));
    }
}
