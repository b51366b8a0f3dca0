//! Error classifier
//!
//! Two rules, one per procedure-service family. Both take the decoded reply,
//! raise a typed error when the embedded status says so, and otherwise hand
//! back the reply with the status fields stripped.

pub mod catalog;

use mailup_domain::{MailUpError, Result};
use serde_json::Value;

pub use catalog::{describe_return_code, IMPORT_RETURN_CODES};

use crate::normalize::{child, text};

/// Check a send/report reply for a non-zero `errorCode`.
///
/// # Errors
/// `MalformedReply` when the code is missing or not numeric; `Remote` with
/// the code and `errorDescription` (or `Error {code}`) when it is non-zero.
pub fn check_send_reply(mut reply: Value) -> Result<Value> {
    let raw_code = child(&reply, "errorCode").map(text).unwrap_or_default();
    let raw_code = raw_code.trim();
    if raw_code.is_empty() {
        return Err(MailUpError::MalformedReply("Missing error code".into()));
    }
    let code: i64 = raw_code
        .parse()
        .map_err(|_| MailUpError::MalformedReply(format!("Invalid error code: {raw_code}")))?;

    if code != 0 {
        let description = child(&reply, "errorDescription").map(text).unwrap_or_default();
        let description =
            if description.is_empty() { format!("Error {code}") } else { description };
        return Err(MailUpError::Remote { code, description });
    }

    if let Some(map) = reply.as_object_mut() {
        map.remove("errorCode");
        map.remove("errorDescription");
    }
    Ok(reply)
}

/// Check an import reply and return `(ReturnCode, mailupBody)`.
///
/// A zero or positive code is the id of the created entity or a status.
///
/// # Errors
/// `MalformedReply` when the code is missing or not numeric; `Import` with
/// the catalog description when it is negative.
pub fn check_import_reply(mut reply: Value) -> Result<(i64, Value)> {
    let mut body = reply
        .as_object_mut()
        .and_then(|map| map.remove("mailupBody"))
        .map(|body| match body {
            Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
            other => other,
        })
        .unwrap_or(Value::Null);

    let raw_code = child(&body, "ReturnCode").map(text).unwrap_or_default();
    let raw_code = raw_code.trim();
    if raw_code.is_empty() {
        return Err(MailUpError::MalformedReply("Missing return code.".into()));
    }
    let code: i64 = raw_code
        .parse()
        .map_err(|_| MailUpError::MalformedReply(format!("Invalid return code: {raw_code}")))?;

    if code < 0 {
        return Err(MailUpError::Import { code, description: describe_return_code(code) });
    }

    if let Some(map) = body.as_object_mut() {
        map.remove("ReturnCode");
    }
    Ok((code, body))
}
