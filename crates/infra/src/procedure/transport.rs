//! HTTP implementation of [`ProcedureTransport`]

use std::collections::HashMap;
use std::fmt::Write as _;

use mailup_core::{AuthenticationHeader, ExchangeTrace, ProcedureTransport, ServiceName};
use mailup_domain::{MailUpError, Result};
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use super::services::ServiceRegistry;
use super::{envelope, xml_tree};
use crate::errors::infra;
use crate::http::HttpClient;

fn format_headers(first_line: &str, headers: &HeaderMap) -> String {
    let mut out = first_line.to_string();
    for (name, value) in headers {
        let _ = write!(out, "\n{}: {}", name, value.to_str().unwrap_or("<binary>"));
    }
    out
}

/// Posts SOAP envelopes to the registered service endpoints.
///
/// With tracing enabled the raw headers and bodies of the last call to each
/// service are kept for [`ProcedureTransport::last_exchange`].
pub struct HttpProcedureTransport {
    http: HttpClient,
    registry: ServiceRegistry,
    tracing: bool,
    traces: Mutex<HashMap<ServiceName, ExchangeTrace>>,
}

impl HttpProcedureTransport {
    pub fn new(http: HttpClient, registry: ServiceRegistry) -> Self {
        Self { http, registry, tracing: false, traces: Mutex::new(HashMap::new()) }
    }

    /// Keep request/response traces.
    #[must_use]
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    fn record(&self, service: ServiceName, trace: ExchangeTrace) {
        if self.tracing {
            self.traces.lock().insert(service, trace);
        }
    }
}

impl ProcedureTransport for HttpProcedureTransport {
    fn invoke(
        &self,
        service: ServiceName,
        method: &str,
        args: &[(&str, Value)],
        header: Option<&AuthenticationHeader>,
    ) -> Result<Value> {
        let description = self.registry.get(service)?;
        let body = envelope::request(&description.namespace, method, args, header)?;
        let action = format!("\"{}\"", description.action(method));

        let request = self
            .http
            .request(Method::POST, &description.url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", action.as_str())
            .body(body.clone());

        let mut trace = ExchangeTrace {
            request_headers: format!(
                "POST {}\ncontent-type: text/xml; charset=utf-8\nsoapaction: {action}",
                description.url
            ),
            request_body: body,
            ..ExchangeTrace::default()
        };

        let response = match self.http.send(request) {
            Ok(response) => response,
            Err(err) => {
                self.record(service, trace);
                return Err(err);
            }
        };

        let status = response.status();
        trace.response_headers = format_headers(&format!("HTTP {status}"), response.headers());
        let text = match response.text() {
            Ok(text) => text,
            Err(err) => {
                self.record(service, trace);
                return Err(infra(err));
            }
        };
        trace.response_body = text.clone();
        self.record(service, trace);

        debug!(service = %service, method, status = status.as_u16(), bytes = text.len(), "Procedure reply");

        if !status.is_success() {
            if let Some(fault) = envelope::fault_string(&text) {
                return Err(MailUpError::Transport(format!("SOAP fault from {service}.{method}: {fault}")));
            }
            return Err(MailUpError::Http {
                status: status.as_u16(),
                message: format!("{service}.{method} failed"),
            });
        }

        let document = envelope::result_document(&text, method)?;
        xml_tree::parse(&document)
    }

    fn last_exchange(&self, service: ServiceName) -> Option<ExchangeTrace> {
        self.traces.lock().get(&service).cloned()
    }
}
