//! HTTP implementation of [`ResourceTransport`]

use mailup_core::{HttpVerb, ResourceEndpoint, ResourceTransport};
use mailup_domain::{MailUpError, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::endpoints::ResourceEndpoints;
use crate::errors::infra;
use crate::http::HttpClient;

fn method(verb: HttpVerb) -> Method {
    match verb {
        HttpVerb::Get => Method::GET,
        HttpVerb::Post => Method::POST,
        HttpVerb::Put => Method::PUT,
        HttpVerb::Delete => Method::DELETE,
    }
}

/// Map a non-2xx status to the matching error.
pub(crate) fn status_error(status: StatusCode, context: &str, body: &str) -> MailUpError {
    let detail = body.trim();
    let message = if detail.is_empty() {
        format!("{context} returned HTTP {}", status.as_u16())
    } else {
        format!("{context} returned HTTP {}: {detail}", status.as_u16())
    };

    match status {
        StatusCode::UNAUTHORIZED => MailUpError::Unauthorized(message),
        StatusCode::NOT_FOUND => MailUpError::NotFound(message),
        _ => MailUpError::Http { status: status.as_u16(), message },
    }
}

/// Sends JSON requests with a bearer token to the REST services.
pub struct HttpResourceTransport {
    http: HttpClient,
    endpoints: ResourceEndpoints,
}

impl HttpResourceTransport {
    pub fn new(http: HttpClient, endpoints: ResourceEndpoints) -> Self {
        Self { http, endpoints }
    }
}

impl ResourceTransport for HttpResourceTransport {
    fn request(
        &self,
        endpoint: ResourceEndpoint,
        path: &str,
        verb: HttpVerb,
        body: Option<&Value>,
        bearer: &str,
    ) -> Result<Value> {
        let url = self.endpoints.url(endpoint, path);

        let mut request = self
            .http
            .request(method(verb), &url)
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.http.send(request)?;
        let status = response.status();
        let text = response.text().map_err(infra)?;
        debug!(%url, verb = verb.as_str(), status = status.as_u16(), "Resource reply");

        if !status.is_success() {
            return Err(status_error(status, &format!("{} {path}", verb.as_str()), &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(infra)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method as http_method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn transport(uri: &str) -> HttpResourceTransport {
        HttpResourceTransport::new(HttpClient::new().unwrap(), ResourceEndpoints::under(Some(uri)))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn get_sends_bearer_and_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(http_method("GET"))
            .and(path("/API/v1.1/Rest/ConsoleService.svc/Console/User/Lists"))
            .and(query_param("pageSize", "20"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Items": []})))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let reply = tokio::task::spawn_blocking(move || {
            transport(&uri).request(
                ResourceEndpoint::Console,
                "/Console/User/Lists?pageNumber=0&pageSize=20",
                HttpVerb::Get,
                None,
                "tok",
            )
        })
        .await
        .unwrap();

        assert_eq!(reply.unwrap(), json!({"Items": []}));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(http_method("POST"))
            .and(path("/API/v1.1/Rest/ConsoleService.svc/Console/List/3/Group"))
            .and(body_json(json!({"Name": "Leads"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"idGroup": 9})))
            .mount(&server)
            .await;

        let uri = server.uri();
        let reply = tokio::task::spawn_blocking(move || {
            transport(&uri).request(
                ResourceEndpoint::Console,
                "/Console/List/3/Group",
                HttpVerb::Post,
                Some(&json!({"Name": "Leads"})),
                "tok",
            )
        })
        .await
        .unwrap();

        assert_eq!(reply.unwrap()["idGroup"], 9);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn statuses_map_to_typed_errors() {
        let server = MockServer::start().await;
        Mock::given(path("/API/v1.1/Rest/ConsoleService.svc/a"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(path("/API/v1.1/Rest/ConsoleService.svc/b"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/API/v1.1/Rest/ConsoleService.svc/c"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        Mock::given(path("/API/v1.1/Rest/ConsoleService.svc/d"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        Mock::given(path("/API/v1.1/Rest/ConsoleService.svc/e"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let uri = server.uri();
        let results = tokio::task::spawn_blocking(move || {
            let transport = transport(&uri);
            ["/a", "/b", "/c", "/d", "/e"]
                .iter()
                .map(|p| transport.request(ResourceEndpoint::Console, p, HttpVerb::Get, None, "tok"))
                .collect::<Vec<_>>()
        })
        .await
        .unwrap();

        assert!(matches!(results[0], Err(MailUpError::Unauthorized(_))));
        assert!(matches!(results[1], Err(MailUpError::NotFound(_))));
        assert!(matches!(results[2], Err(MailUpError::Http { status: 500, ref message }) if message.contains("boom")));
        assert!(matches!(results[3], Err(MailUpError::MalformedReply(_))));
        assert_eq!(results[4].as_ref().unwrap(), &Value::Null);
    }
}
