use std::time::Duration;

use mailup_domain::constants::DEFAULT_TIMEOUT_SECS;
use mailup_domain::{MailUpError, Result};
use reqwest::blocking::{Client as ReqwestClient, RequestBuilder, Response};
use reqwest::Method;
use tracing::debug;

use crate::errors::infra;

/// Blocking HTTP client with a per-request timeout.
///
/// Requests are sent exactly once; callers see the first failure.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder.
    ///
    /// Non-2xx statuses are returned as responses; only transport failures
    /// become errors.
    pub fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build().map_err(infra)?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request) {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(infra(err))
            }
        }
    }
}

/// Builder for [`HttpClient`]. Proxies from the environment are ignored.
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS), agent: None }
    }
}

impl HttpClientBuilder {
    /// Whole-request timeout, connect included.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// # Errors
    /// `Config` for a zero timeout; otherwise whatever reqwest reports while
    /// setting up TLS.
    pub fn build(self) -> Result<HttpClient> {
        if self.timeout.is_zero() {
            return Err(MailUpError::Config("HTTP timeout must be positive".into()));
        }

        let builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();
        let builder = match self.agent {
            Some(agent) => builder.user_agent(agent),
            None => builder,
        };

        builder.build().map(|client| HttpClient { client }).map_err(infra)
    }
}
