//! Client constants
//!
//! Centralized location for the limits and defaults shared by the crates.

// Credential cache policies
pub const PROCEDURE_TOKEN_MINUTES: i64 = 60;
pub const RESOURCE_TOKEN_MINUTES: i64 = 14;
pub const TOKEN_SAFETY_MARGIN_SECS: i64 = 30;
pub const PROCEDURE_TOKEN_SUFFIX: &str = "accessKey";
pub const RESOURCE_TOKEN_SUFFIX: &str = "oauthToken";

// Remote endpoints
pub const DEFAULT_SERVICES_URL: &str = "https://services.mailup.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Local validation limits
pub const MAX_GROUP_NAME_LENGTH: usize = 50;
pub const MAX_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
