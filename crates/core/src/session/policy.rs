//! Per-protocol token lifetime policies

use chrono::Duration;
use mailup_domain::constants::{
    PROCEDURE_TOKEN_MINUTES, PROCEDURE_TOKEN_SUFFIX, RESOURCE_TOKEN_MINUTES,
    RESOURCE_TOKEN_SUFFIX, TOKEN_SAFETY_MARGIN_SECS,
};

/// How long a token lives and whether using it extends its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    pub lifetime: Duration,
    pub margin: Duration,
    /// Re-stamp the token with the current time when fetched for use
    pub reset_on_use: bool,
    /// Suffix of the persisted record key
    pub suffix: &'static str,
}

impl TokenPolicy {
    /// Procedure-protocol access keys: 60 minutes.
    pub fn procedure(reset_on_use: bool) -> Self {
        Self {
            lifetime: Duration::minutes(PROCEDURE_TOKEN_MINUTES),
            margin: Duration::seconds(TOKEN_SAFETY_MARGIN_SECS),
            reset_on_use,
            suffix: PROCEDURE_TOKEN_SUFFIX,
        }
    }

    /// Resource-protocol bearer tokens: 14 minutes.
    pub fn resource(reset_on_use: bool) -> Self {
        Self {
            lifetime: Duration::minutes(RESOURCE_TOKEN_MINUTES),
            margin: Duration::seconds(TOKEN_SAFETY_MARGIN_SECS),
            reset_on_use,
            suffix: RESOURCE_TOKEN_SUFFIX,
        }
    }

    /// Tokens stamped at or before the returned instant are expired.
    pub fn cutoff(&self, now: i64) -> i64 {
        now - self.lifetime.num_seconds() - self.margin.num_seconds()
    }
}
