//! Shared helpers for the HTTP integration tests.

use mailup_domain::ClientConfig;

/// SOAP 1.1 reply whose `{method}Result` carries `inner` as escaped XML.
pub fn soap_reply(namespace: &str, method: &str, inner: &str) -> String {
    let escaped = inner.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;");
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">\
         <soap:Body><{method}Response xmlns=\"{namespace}\">\
         <{method}Result>{escaped}</{method}Result>\
         </{method}Response></soap:Body></soap:Envelope>"
    )
}

/// Send/report reply with `errorCode` 0 and `body` inside `mailupMessage`.
pub fn send_ok(body: &str) -> String {
    format!("<mailupMessage><errorCode>0</errorCode><errorDescription/>{body}</mailupMessage>")
}

/// Configuration pointing every endpoint at the mock server at `uri`.
pub fn config_for(uri: &str) -> ClientConfig {
    let mut config = ClientConfig::new("a1234", "secret", "https://console.example.com/");
    config.services_url = Some(uri.to_string());
    config.import_url = Some(format!("{uri}/Services/WSMailUpImport.asmx"));
    config.timeout_secs = 5;
    config
}

/// Same as [`config_for`] with the resource protocol enabled.
pub fn resource_config_for(uri: &str) -> ClientConfig {
    let mut config = config_for(uri);
    config.client_id = Some("cid".into());
    config.client_secret = Some("csecret".into());
    config
}
