//! Procedure-protocol plumbing: login, logout and classified calls

use mailup_domain::{MailUpError, Result};
use serde_json::Value;
use tracing::{debug, info};

use super::MailUpService;
use crate::classify::{check_import_reply, check_send_reply};
use crate::normalize::{child, text};
use crate::ports::{AuthenticationHeader, ProcedureTransport, ServiceName};

/// Invoke a send/report/manage method and check its `errorCode`.
fn send_call(
    transport: &dyn ProcedureTransport,
    debug: bool,
    service: ServiceName,
    method: &str,
    args: &[(&str, Value)],
) -> Result<Value> {
    debug!(service = %service, method, "Procedure call");
    transport
        .invoke(service, method, args, None)
        .and_then(check_send_reply)
        .map_err(|err| diagnose(transport, debug, service, err))
}

/// Attach the trace of the last call to `service` in debug mode.
fn diagnose(
    transport: &dyn ProcedureTransport,
    debug: bool,
    service: ServiceName,
    err: MailUpError,
) -> MailUpError {
    if !debug {
        return err;
    }
    match transport.last_exchange(service) {
        Some(trace) => err.with_diagnostics(trace.trailer()),
        None => err,
    }
}

impl MailUpService {
    /// Procedure-protocol access key; see [`CredentialCache::get_token`].
    ///
    /// [`CredentialCache::get_token`]: crate::session::CredentialCache::get_token
    pub(crate) fn access_key(&mut self, for_use: bool, generate: bool) -> Result<Option<String>> {
        let transport = self.procedure.as_ref();
        let credentials = &self.credentials;
        let debug = self.debug;

        self.access_keys.get_token(for_use, generate, || {
            let args = [
                ("user", Value::from(credentials.username())),
                ("pwd", Value::from(credentials.password())),
                ("consoleId", Value::from(credentials.console_id())),
            ];
            let reply = send_call(transport, debug, ServiceName::Send, "LoginFromId", &args)?;
            let key = child(&reply, "accessKey").map(text).unwrap_or_default();
            if key.is_empty() {
                return Err(MailUpError::MalformedReply("Login reply without accessKey".into()));
            }
            info!(username = credentials.username(), "Logged in");
            Ok(key)
        })
    }

    /// Access key for an operation that is about to use it.
    pub(crate) fn required_access_key(&mut self) -> Result<String> {
        self.access_key(true, true)?
            .ok_or_else(|| MailUpError::MalformedReply("No access key available".into()))
    }

    pub(crate) fn send(
        &self,
        service: ServiceName,
        method: &str,
        args: &[(&str, Value)],
    ) -> Result<Value> {
        send_call(self.procedure.as_ref(), self.debug, service, method, args)
    }

    /// Invoke an import method with the `Authentication` header and return
    /// `(ReturnCode, body)`.
    pub(crate) fn import_call(&self, method: &str, args: &[(&str, Value)]) -> Result<(i64, Value)> {
        let transport = self.procedure.as_ref();
        let header =
            AuthenticationHeader::new(self.credentials.username(), self.credentials.password());

        debug!(service = %ServiceName::Import, method, "Procedure call");
        transport
            .invoke(ServiceName::Import, method, args, Some(&header))
            .and_then(check_import_reply)
            .map_err(|err| diagnose(transport, self.debug, ServiceName::Import, err))
    }

    /// End the procedure session and forget both cached tokens.
    ///
    /// No login is performed just to log out: without a valid access key the
    /// remote call is skipped. The caches are cleared even when the remote
    /// call fails.
    pub fn logout(&mut self) -> Result<()> {
        let outcome = match self.access_key(false, false) {
            Ok(Some(key)) => {
                self.send(ServiceName::Send, "Logout", &[("accessKey", Value::from(key))]).map(drop)
            }
            Ok(None) => {
                debug!("No valid access key, skipping remote logout");
                Ok(())
            }
            Err(err) => Err(err),
        };

        self.access_keys.invalidate();
        self.bearer_tokens.invalidate();
        info!(username = self.credentials.username(), "Logged out");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use mailup_domain::MailUpError;
    use serde_json::json;

    use crate::service::testing::{fixture, import_reply, login_reply, nl_lists_reply, ok_reply};

    #[test]
    fn login_happens_once_and_key_is_reused() {
        let mut fx = fixture();
        fx.procedure.reply("LoginFromId", login_reply("key-1"));

        assert_eq!(fx.service.required_access_key().unwrap(), "key-1");
        assert_eq!(fx.service.required_access_key().unwrap(), "key-1");

        let calls = fx.procedure.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "LoginFromId");
        assert_eq!(calls[0].arg("user"), Some(json!("a1234")));
        assert_eq!(calls[0].arg("consoleId"), Some(json!(1234)));
    }

    #[test]
    fn logout_without_token_skips_remote_call() {
        let mut fx = fixture();

        fx.service.logout().unwrap();

        assert!(fx.procedure.calls().is_empty());
    }

    #[test]
    fn logout_uses_cached_key_and_clears_caches() {
        let mut fx = fixture();
        fx.procedure.reply("LoginFromId", login_reply("key-1"));
        fx.procedure.reply("Logout", ok_reply(json!({})));
        fx.service.required_access_key().unwrap();

        fx.service.logout().unwrap();

        let calls = fx.procedure.calls();
        assert_eq!(calls.last().map(|c| c.method.as_str()), Some("Logout"));
        assert_eq!(calls.last().and_then(|c| c.arg("accessKey")), Some(json!("key-1")));
        assert!(fx.store.is_empty());

        fx.procedure.reply("LoginFromId", login_reply("key-2"));
        assert_eq!(fx.service.required_access_key().unwrap(), "key-2");
    }

    #[test]
    fn failed_logout_still_clears_caches() {
        let mut fx = fixture();
        fx.procedure.reply("LoginFromId", login_reply("key-1"));
        fx.procedure.reply("Logout", json!({"errorCode": "3", "errorDescription": "Session expired"}));
        fx.service.required_access_key().unwrap();

        let err = fx.service.logout().unwrap_err();

        assert_eq!(err.to_string(), "Session expired");
        assert!(fx.store.is_empty());
    }

    #[test]
    fn login_failure_is_classified() {
        let mut fx = fixture();
        fx.procedure
            .reply("LoginFromId", json!({"errorCode": "100", "errorDescription": "Wrong password"}));

        let err = fx.service.required_access_key().unwrap_err();

        assert_eq!(err.code(), Some(100));
        assert_eq!(err.to_string(), "Wrong password");
    }

    #[test]
    fn debug_mode_appends_trace() {
        let mut fx = crate::service::testing::debug_fixture();
        fx.procedure
            .reply("LoginFromId", json!({"errorCode": "100", "errorDescription": "Wrong password"}));

        let err = fx.service.required_access_key().unwrap_err();

        assert!(err.to_string().starts_with("Wrong password\n\nRequest headers:\n"));
        assert!(err.to_string().contains("\n\nResponse body:\n"));
        assert_eq!(err.code(), Some(100));
    }

    #[test]
    fn debug_mode_appends_import_trace() {
        let fx = crate::service::testing::debug_fixture();
        fx.procedure.reply("GetNlLists", nl_lists_reply());
        fx.procedure.reply("CreateGroup", import_reply(-303, json!({})));

        let err = fx.service.create_group(10, "Leads").unwrap_err();

        match &err {
            MailUpError::Diagnosed { source, trailer } => {
                assert!(matches!(**source, MailUpError::Import { code: -303, .. }));
                assert!(trailer.starts_with("\n\nRequest headers:\nPOST /"));
                assert!(trailer.contains("<CreateGroup/>"));
                assert!(trailer.contains("\n\nResponse body:\n"));
                assert!(trailer.contains("-303"));
            }
            other => panic!("expected diagnosed error, got {other:?}"),
        }
        assert!(err.to_string().starts_with("The group already exists.\n\nRequest headers:"));
        assert_eq!(err.code(), Some(-303));
    }

    #[test]
    fn import_failure_without_debug_has_no_trace() {
        let fx = fixture();
        fx.procedure.reply("GetNlLists", nl_lists_reply());
        fx.procedure.reply("CreateGroup", import_reply(-303, json!({})));

        let err = fx.service.create_group(10, "Leads").unwrap_err();

        assert!(matches!(err, MailUpError::Import { code: -303, .. }));
        assert_eq!(err.diagnostics(), None);
    }
}
