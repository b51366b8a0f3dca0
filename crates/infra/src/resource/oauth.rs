//! OAuth password grant for the resource protocol

use mailup_core::ResourceAuthorizer;
use mailup_domain::{MailUpError, ResourceClient, Result};
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::transport::status_error;
use crate::errors::infra;
use crate::http::HttpClient;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct OAuthError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges account credentials for a bearer token at the token endpoint.
pub struct PasswordGrantAuthorizer {
    http: HttpClient,
    token_url: String,
}

impl PasswordGrantAuthorizer {
    pub fn new(http: HttpClient, token_url: impl Into<String>) -> Self {
        Self { http, token_url: token_url.into() }
    }
}

impl ResourceAuthorizer for PasswordGrantAuthorizer {
    fn password_grant(&self, client: &ResourceClient, username: &str, password: &str) -> Result<String> {
        let params = [
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
            ("client_id", client.client_id.as_str()),
            ("client_secret", client.client_secret.as_str()),
        ];

        let request = self
            .http
            .request(Method::POST, &self.token_url)
            .basic_auth(&client.client_id, Some(&client.client_secret))
            .header(ACCEPT, "application/json")
            .form(&params);

        let response = self.http.send(request)?;
        let status = response.status();
        let text = response.text().map_err(infra)?;

        if !status.is_success() {
            let error: OAuthError = serde_json::from_str(&text).unwrap_or_default();
            let detail = error.error_description.unwrap_or(error.error);
            // The token endpoint answers 400 for rejected credentials.
            if status == StatusCode::BAD_REQUEST {
                return Err(MailUpError::Unauthorized(format!("Password grant rejected: {detail}")));
            }
            return Err(status_error(status, "Password grant", &detail));
        }

        let token: TokenResponse = serde_json::from_str(&text).map_err(infra)?;
        if token.access_token.is_empty() {
            return Err(MailUpError::MalformedReply("Token reply without access_token".into()));
        }

        debug!(expires_in = ?token.expires_in, "Password grant accepted");
        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client() -> ResourceClient {
        ResourceClient { client_id: "cid".into(), client_secret: "csecret".into() }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn grant_posts_form_and_returns_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Authorization/OAuth/Token"))
            .and(header_exists("authorization"))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("username=a1234"))
            .and(body_string_contains("client_id=cid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok-1",
                "expires_in": 900,
                "refresh_token": "r"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/Authorization/OAuth/Token", server.uri());
        let token = tokio::task::spawn_blocking(move || {
            PasswordGrantAuthorizer::new(HttpClient::new().unwrap(), url).password_grant(&client(), "a1234", "pw")
        })
        .await
        .unwrap();

        assert_eq!(token.unwrap(), "tok-1");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rejected_credentials_are_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Wrong username or password"
            })))
            .mount(&server)
            .await;

        let url = server.uri();
        let err = tokio::task::spawn_blocking(move || {
            PasswordGrantAuthorizer::new(HttpClient::new().unwrap(), url).password_grant(&client(), "a1234", "bad")
        })
        .await
        .unwrap()
        .unwrap_err();

        assert!(matches!(err, MailUpError::Unauthorized(ref m) if m.contains("Wrong username")));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reply_without_token_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})))
            .mount(&server)
            .await;

        let url = server.uri();
        let err = tokio::task::spawn_blocking(move || {
            PasswordGrantAuthorizer::new(HttpClient::new().unwrap(), url).password_grant(&client(), "a1234", "pw")
        })
        .await
        .unwrap()
        .unwrap_err();

        assert!(matches!(err, MailUpError::MalformedReply(_)));
    }
}
