//! Credential cache
//!
//! Holds one access token in memory, mirrored to an optional [`TokenStore`]
//! so that a restarted process can reuse a still-valid token instead of
//! logging in again.
//!
//! ## Expiry
//! A token stamped at or before `now - lifetime - margin` is expired. Expired
//! tokens are dropped from memory and deleted from the store before anything
//! else happens, so a fetch that does not refresh can never return one.
//!
//! ## Persistence
//! The store is rewritten when the token is re-stamped on use, or when it
//! has no record yet. Store failures are logged and otherwise ignored.

use std::sync::Arc;

use mailup_common::time::Clock;
use mailup_domain::Result;
use tracing::{debug, warn};

use super::policy::TokenPolicy;
use crate::ports::{CachedToken, TokenStore};

/// Access-token cache for one protocol and one account
pub struct CredentialCache {
    policy: TokenPolicy,
    key: String,
    store: Option<Arc<dyn TokenStore>>,
    clock: Arc<dyn Clock>,
    current: Option<CachedToken>,
}

impl CredentialCache {
    /// `account_key` is the sanitized username; the policy suffix is
    /// appended to form the store key.
    pub fn new(
        policy: TokenPolicy,
        account_key: &str,
        store: Option<Arc<dyn TokenStore>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            key: format!("{account_key}.{}", policy.suffix),
            policy,
            store,
            clock,
            current: None,
        }
    }

    pub fn policy(&self) -> &TokenPolicy {
        &self.policy
    }

    /// Key of the persisted record.
    pub fn store_key(&self) -> &str {
        &self.key
    }

    /// The in-memory token, without any expiry check.
    pub fn peek(&self) -> Option<&CachedToken> {
        self.current.as_ref()
    }

    /// Return a valid token, obtaining one through `exchange` if needed.
    ///
    /// * `for_use` - the caller is about to use the token; with a
    ///   reset-on-use policy its timestamp moves to now.
    /// * `generate` - run `exchange` when no valid token exists. When
    ///   `false`, `Ok(None)` is returned instead.
    ///
    /// # Errors
    /// Propagates the error of `exchange`; the cache is left as it was.
    pub fn get_token<F>(&mut self, for_use: bool, generate: bool, exchange: F) -> Result<Option<String>>
    where
        F: FnOnce() -> Result<String>,
    {
        let now = self.clock.unix_seconds();
        let cutoff = self.policy.cutoff(now);

        if self.current.as_ref().is_some_and(|t| t.obtained_at <= cutoff) {
            debug!(key = %self.key, "Discarding expired in-memory token");
            self.current = None;
        }

        if self.current.is_none() {
            self.current = self.load_persisted(cutoff);
        }

        if self.current.is_none() {
            if !generate {
                return Ok(None);
            }
            let value = exchange()?;
            debug!(key = %self.key, "Obtained new access token");
            self.current = Some(CachedToken { value, obtained_at: now });
        }

        let reset = self.policy.reset_on_use && for_use;
        let Some(token) = self.current.as_mut() else {
            return Ok(None);
        };
        if reset {
            token.obtained_at = now;
        }
        let token = token.clone();

        if let Some(store) = &self.store {
            if reset || !store.contains(&self.key) {
                if let Err(err) = store.save(&self.key, &token) {
                    warn!(key = %self.key, error = %err, "Failed to persist access token");
                }
            }
        }

        Ok(Some(token.value))
    }

    /// Forget the token, in memory and in the store.
    pub fn invalidate(&mut self) {
        self.current = None;
        if let Some(store) = &self.store {
            if let Err(err) = store.remove(&self.key) {
                warn!(key = %self.key, error = %err, "Failed to remove persisted access token");
            }
        }
    }

    fn load_persisted(&self, cutoff: i64) -> Option<CachedToken> {
        let store = self.store.as_ref()?;

        match store.load(&self.key) {
            Ok(Some(token)) if token.obtained_at > cutoff && !token.value.is_empty() => {
                debug!(key = %self.key, "Reusing persisted access token");
                return Some(token);
            }
            Ok(Some(_)) => {
                debug!(key = %self.key, "Persisted access token is stale");
            }
            Ok(None) => return None,
            Err(err) => {
                warn!(key = %self.key, error = %err, "Unreadable persisted access token");
            }
        }

        if let Err(err) = store.remove(&self.key) {
            warn!(key = %self.key, error = %err, "Failed to remove persisted access token");
        }
        None
    }
}
