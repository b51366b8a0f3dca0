//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and
//! building a client from it.

use std::io::Write;

use mailup_infra::{config, MailUpClient};
use tempfile::Builder;

fn config_file(extension: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut temp_file =
        Builder::new().suffix(extension).tempfile().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    temp_file
}

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "username": "a1234",
        "password": "secret",
        "console_url": "https://console.example.com/frontend",
        "client_id": "cid",
        "client_secret": "csecret",
        "cache_dir": "/tmp/mailup-cache",
        "debug": true,
        "timeout_secs": 10
    }"#;
    let temp_file = config_file(".json", json_content);

    let result = config::load_from_file(Some(temp_file.path().to_path_buf()));
    assert!(result.is_ok(), "Failed to load config from JSON file");

    let config = result.unwrap();
    assert_eq!(config.username, "a1234");
    assert_eq!(config.client_id.as_deref(), Some("cid"));
    assert_eq!(config.timeout_secs, 10);
    assert!(config.debug);

    // Defaults for everything not in the file
    assert_eq!(config.console_id, None);
    assert_eq!(config.services_url, None);
    assert!(config.procedure_reset_on_use);
    assert!(!config.resource_reset_on_use);
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
        username = "john@example.com"
        password = "secret"
        console_url = "console.example.com"
        console_id = 42
        services_url = "http://localhost:8080"
        procedure_reset_on_use = false
    "#;
    let temp_file = config_file(".toml", toml_content);

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("Failed to load config from TOML file");

    assert_eq!(config.console_id, Some(42));
    assert_eq!(config.services_url.as_deref(), Some("http://localhost:8080"));
    assert!(!config.procedure_reset_on_use);
}

#[test]
fn test_missing_required_field_is_rejected() {
    let temp_file = config_file(".json", r#"{"username": "a1234", "password": "secret"}"#);

    let result = config::load_from_file(Some(temp_file.path().to_path_buf()));
    assert!(result.is_err(), "A config without console_url must not load");
}

#[test]
fn test_client_builds_from_loaded_config() {
    let temp_file = config_file(
        ".toml",
        "username = \"a1234\"\npassword = \"secret\"\nconsole_url = \"https://console.example.com/\"\n",
    );

    let config = config::load_from_file(Some(temp_file.path().to_path_buf())).unwrap();
    let client = MailUpClient::new(&config).expect("client from file config");

    assert_eq!(client.credentials().console_host(), "console.example.com");
    assert_eq!(client.credentials().console_id(), 1234);
}

#[test]
fn test_client_rejects_username_without_console_id() {
    let temp_file = config_file(
        ".json",
        r#"{"username": "john@example.com", "password": "secret", "console_url": "console.example.com"}"#,
    );

    let config = config::load_from_file(Some(temp_file.path().to_path_buf())).unwrap();
    assert!(MailUpClient::new(&config).is_err());
}
