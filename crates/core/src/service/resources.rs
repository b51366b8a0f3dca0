//! Resource-protocol operations (console and mail statistics endpoints)

use mailup_domain::constants::MAX_GROUP_NAME_LENGTH;
use mailup_domain::{
    ConsoleGroup, ConsoleList, MailUpError, MessageStatistics, Page, Paging, RecipientActivity,
    Result,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::lists::required_id;
use super::{MailUpService, ResourceBackend};
use crate::normalize::{field_specs, normalize, Normalized};
use crate::ports::{HttpVerb, ResourceEndpoint};

/* -------------------------------------------------------------------------- */
/* Reply decoding */
/* -------------------------------------------------------------------------- */

const CONSOLE_LIST_FIELDS: &[(&str, &str)] = &[
    ("IdList", "integer>id"),
    ("Name", "string>name"),
    ("ListGuid", "string>guid"),
    ("Description", "string>description"),
];

const CONSOLE_GROUP_FIELDS: &[(&str, &str)] = &[
    ("idGroup", "integer>id"),
    ("idList", "integer>list_id"),
    ("Name", "string>name"),
    ("Notes", "string>notes"),
    ("Deletable", "boolean>deletable"),
];

const RECIPIENT_FIELDS: &[(&str, &str)] =
    &[("IdRecipient", "integer>recipient_id"), ("Email", "string>email"), ("Count", "integer>count")];

const PAGE_FIELDS: &[(&str, &str)] = &[
    ("PageNumber", "integer>page_number"),
    ("PageSize", "integer>page_size"),
    ("TotalElementsCount", "integer>total_elements"),
    ("IsPaginated", "boolean>is_paginated"),
];

fn console_list(fields: &Normalized) -> Result<ConsoleList> {
    Ok(ConsoleList {
        id: required_id(fields, "id", "List")?,
        name: fields.text("name"),
        guid: fields.opt_text("guid"),
        description: fields.opt_text("description"),
    })
}

fn console_group(fields: &Normalized) -> Result<ConsoleGroup> {
    Ok(ConsoleGroup {
        id: required_id(fields, "id", "Group")?,
        list_id: fields.int("list_id"),
        name: fields.text("name"),
        notes: fields.opt_text("notes"),
        deletable: fields.flag("deletable"),
    })
}

fn recipient_activity(fields: &Normalized) -> Result<RecipientActivity> {
    Ok(RecipientActivity {
        recipient_id: fields.int("recipient_id"),
        email: fields.text("email"),
        count: fields.int("count"),
    })
}

/// Decode a paginated listing, falling back to the requested paging for
/// missing counters.
fn page<T>(
    reply: &Value,
    paging: Paging,
    item_fields: &[(&str, &str)],
    item: fn(&Normalized) -> Result<T>,
) -> Result<Page<T>> {
    let fields = normalize(reply, &field_specs(PAGE_FIELDS)?);
    let specs = field_specs(item_fields)?;
    let items = match fields.get("Items") {
        Some(Value::Array(items)) => {
            items.iter().map(|node| item(&normalize(node, &specs))).collect::<Result<Vec<_>>>()?
        }
        Some(Value::Null) | None => Vec::new(),
        Some(_) => return Err(MailUpError::MalformedReply("Items is not a list".into())),
    };

    let counter = |key: &str, fallback: u32| {
        fields.int(key).and_then(|n| u32::try_from(n).ok()).unwrap_or(fallback)
    };

    Ok(Page {
        page_number: counter("page_number", paging.page_number),
        page_size: counter("page_size", paging.page_size),
        total_elements: fields
            .int("total_elements")
            .unwrap_or_else(|| i64::try_from(items.len()).unwrap_or(i64::MAX)),
        is_paginated: fields.flag("is_paginated").unwrap_or(false),
        items,
    })
}

/// A bare counter reply, as returned by the `Count` endpoints.
fn counter_value(reply: &Value, path: &str) -> Result<i64> {
    match reply {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| MailUpError::MalformedReply(format!("Non-numeric reply from {path}")))
}

/* -------------------------------------------------------------------------- */
/* Facade */
/* -------------------------------------------------------------------------- */

impl MailUpService {
    fn resource_backend(&self) -> Result<&ResourceBackend> {
        self.resource
            .as_ref()
            .ok_or_else(|| MailUpError::Config("Resource protocol is not configured".into()))
    }

    /// Bearer token for the resource endpoints, obtained through the
    /// password grant when none is cached.
    fn bearer(&mut self) -> Result<String> {
        let backend = self
            .resource
            .as_ref()
            .ok_or_else(|| MailUpError::Config("Resource protocol is not configured".into()))?;
        let client = self
            .credentials
            .resource_client()
            .ok_or_else(|| MailUpError::Config("Missing client id and client secret".into()))?;
        let authorizer = backend.authorizer.as_ref();
        let credentials = &self.credentials;

        self.bearer_tokens
            .get_token(true, true, || {
                let token =
                    authorizer.password_grant(client, credentials.username(), credentials.password())?;
                info!(username = credentials.username(), "Resource token granted");
                Ok(token)
            })?
            .ok_or_else(|| MailUpError::MalformedReply("No bearer token available".into()))
    }

    /// One authorized resource call. A rejected token is forgotten so the
    /// next call obtains a fresh one.
    fn resource_call(
        &mut self,
        endpoint: ResourceEndpoint,
        path: &str,
        verb: HttpVerb,
        body: Option<&Value>,
    ) -> Result<Value> {
        let bearer = self.bearer()?;
        debug!(?endpoint, path, verb = verb.as_str(), "Resource call");

        let outcome = self.resource_backend()?.transport.request(endpoint, path, verb, body, &bearer);
        if let Err(err) = &outcome {
            if matches!(err.root(), MailUpError::Unauthorized(_)) {
                debug!("Bearer token rejected, discarding it");
                self.bearer_tokens.invalidate();
            }
        }
        outcome
    }

    /// Lists visible to the authenticated user.
    pub fn console_lists(&mut self, paging: Paging) -> Result<Page<ConsoleList>> {
        paging.validate()?;
        let path = format!("/Console/User/Lists?{}", paging.query());
        let reply = self.resource_call(ResourceEndpoint::Console, &path, HttpVerb::Get, None)?;
        page(&reply, paging, CONSOLE_LIST_FIELDS, console_list)
    }

    pub fn console_list_groups(&mut self, list_id: i64, paging: Paging) -> Result<Page<ConsoleGroup>> {
        paging.validate()?;
        let path = format!("/Console/List/{list_id}/Groups?{}", paging.query());
        let reply = self.resource_call(ResourceEndpoint::Console, &path, HttpVerb::Get, None)?;
        page(&reply, paging, CONSOLE_GROUP_FIELDS, console_group)
    }

    /// Create a deletable group in `list_id`.
    ///
    /// # Errors
    /// `Validation` for names longer than 50 characters, checked before any
    /// remote call.
    pub fn create_console_group(
        &mut self,
        list_id: i64,
        name: &str,
        notes: &str,
    ) -> Result<ConsoleGroup> {
        if name.chars().count() > MAX_GROUP_NAME_LENGTH {
            return Err(MailUpError::validation(format!(
                "Maximum length of a group name is {MAX_GROUP_NAME_LENGTH} characters"
            )));
        }

        let body = json!({"Name": name, "Notes": notes, "Deletable": true});
        let path = format!("/Console/List/{list_id}/Group");
        let reply = self.resource_call(ResourceEndpoint::Console, &path, HttpVerb::Post, Some(&body))?;

        let group = console_group(&normalize(&reply, &field_specs(CONSOLE_GROUP_FIELDS)?))?;
        info!(list_id, group_id = group.id, "Console group created");
        Ok(group)
    }

    pub fn delete_console_group(&mut self, list_id: i64, group_id: i64) -> Result<()> {
        let path = format!("/Console/List/{list_id}/Group/{group_id}");
        self.resource_call(ResourceEndpoint::Console, &path, HttpVerb::Delete, None)?;
        info!(list_id, group_id, "Console group deleted");
        Ok(())
    }

    /// Views, clicks, bounces and unsubscriptions of a message.
    pub fn message_statistics(&mut self, message_id: i64) -> Result<MessageStatistics> {
        let mut count = |what: &str| -> Result<i64> {
            let path = format!("/Message/{message_id}/Count/{what}");
            let reply = self.resource_call(ResourceEndpoint::MailStatistics, &path, HttpVerb::Get, None)?;
            counter_value(&reply, &path)
        };

        Ok(MessageStatistics {
            views: count("Views")?,
            clicks: count("Clicks")?,
            bounces: count("Bounces")?,
            unsubscriptions: count("Unsubscriptions")?,
        })
    }

    /// Recipients who viewed a message, with their view counts.
    pub fn message_views(&mut self, message_id: i64, paging: Paging) -> Result<Page<RecipientActivity>> {
        paging.validate()?;
        let path = format!("/Message/{message_id}/List/Views?{}", paging.query());
        let reply = self.resource_call(ResourceEndpoint::MailStatistics, &path, HttpVerb::Get, None)?;
        page(&reply, paging, RECIPIENT_FIELDS, recipient_activity)
    }
}
