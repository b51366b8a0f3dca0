//! Configuration loader
//!
//! Loads the client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `MAILUP_USERNAME`, `MAILUP_PASSWORD`, `MAILUP_CONSOLE_URL`: required
//! - `MAILUP_CONSOLE_ID`: numeric console id
//! - `MAILUP_CLIENT_ID`, `MAILUP_CLIENT_SECRET`: resource-protocol client
//! - `MAILUP_CACHE_DIR`: token cache directory
//! - `MAILUP_DEBUG`: append request traces to errors (true/false)
//! - `MAILUP_SERVICES_URL`, `MAILUP_IMPORT_URL`: endpoint overrides
//! - `MAILUP_TIMEOUT_SECS`: HTTP timeout
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./mailup.json` or `./mailup.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use mailup_domain::{ClientConfig, MailUpError, Result};

const FILE_NAMES: [&str; 4] = ["mailup.json", "mailup.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `MailUpError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `MailUpError::Config` if a required variable is missing or a
/// numeric one does not parse.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config =
        ClientConfig::new(env_var("MAILUP_USERNAME")?, env_var("MAILUP_PASSWORD")?, env_var("MAILUP_CONSOLE_URL")?);

    config.console_id = env_opt("MAILUP_CONSOLE_ID")
        .map(|s| {
            s.parse::<u64>()
                .map_err(|e| MailUpError::Config(format!("Invalid MAILUP_CONSOLE_ID: {e}")))
        })
        .transpose()?;
    config.client_id = env_opt("MAILUP_CLIENT_ID");
    config.client_secret = env_opt("MAILUP_CLIENT_SECRET");
    config.cache_dir = env_opt("MAILUP_CACHE_DIR").map(PathBuf::from);
    config.debug = env_bool("MAILUP_DEBUG", false);
    config.services_url = env_opt("MAILUP_SERVICES_URL");
    config.import_url = env_opt("MAILUP_IMPORT_URL");
    if let Some(timeout) = env_opt("MAILUP_TIMEOUT_SECS") {
        config.timeout_secs = timeout
            .parse::<u64>()
            .map_err(|e| MailUpError::Config(format!("Invalid MAILUP_TIMEOUT_SECS: {e}")))?;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `MailUpError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MailUpError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            MailUpError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MailUpError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `MailUpError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MailUpError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MailUpError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(MailUpError::Config(format!("Unsupported config format: {extension}"))),
    }
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    [dir.to_path_buf(), dir.join(".."), dir.join("../..")]
        .iter()
        .flat_map(|base| FILE_NAMES.iter().map(move |name| base.join(name)))
        .collect()
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.is_file())
}

/// Get required environment variable
///
/// # Errors
/// Returns `MailUpError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        MailUpError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Optional environment variable; empty values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
