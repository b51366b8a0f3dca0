//! List and group operations over the procedure protocol

use mailup_domain::constants::MAX_GROUP_NAME_LENGTH;
use mailup_domain::{Group, List, MailUpError, MailingList, Result};
use serde_json::Value;
use tracing::info;

use super::MailUpService;
use crate::import::find_list;
use crate::normalize::{descend, field_specs, normalize, Normalized};
use crate::ports::ServiceName;

pub(crate) fn required_id(fields: &Normalized, key: &str, what: &str) -> Result<i64> {
    fields
        .int(key)
        .ok_or_else(|| MailUpError::MalformedReply(format!("{what} without a numeric id")))
}

impl MailUpService {
    /// Every list of the console, as seen by the send service.
    pub fn get_lists(&mut self) -> Result<Vec<MailingList>> {
        let key = self.required_access_key()?;
        let reply = self.send(ServiceName::Send, "GetLists", &[("accessKey", Value::from(key))])?;

        let specs = field_specs(&[("listID", "integer>id"), ("listName", "string>name")])?;
        descend(&reply, &["lists", "list"])
            .into_iter()
            .map(|node| {
                let fields = normalize(node, &specs);
                Ok(MailingList { id: required_id(&fields, "id", "List")?, name: fields.text("name") })
            })
            .collect()
    }

    /// Every list with its GUID and groups. Fetched fresh on each call.
    pub fn get_lists_and_groups(&self) -> Result<Vec<List>> {
        let (_, body) = self.import_call("GetNlLists", &[])?;

        let list_specs = field_specs(&[
            ("@idList", "integer>id"),
            ("@listGUID", "string>guid"),
            ("@listName", "string>name"),
        ])?;
        let group_specs = field_specs(&[("@idGroup", "integer>id"), ("@groupName", "string>name")])?;

        descend(&body, &["Lists", "List"])
            .into_iter()
            .map(|node| {
                let fields = normalize(node, &list_specs);
                let groups = descend(node, &["Groups", "Group"])
                    .into_iter()
                    .map(|group| {
                        let fields = normalize(group, &group_specs);
                        Ok(Group { id: required_id(&fields, "id", "Group")?, name: fields.text("name") })
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(List {
                    id: required_id(&fields, "id", "List")?,
                    guid: fields.text("guid"),
                    name: fields.text("name"),
                    groups,
                })
            })
            .collect()
    }

    /// Create a group in `list_id`.
    ///
    /// # Errors
    /// `Validation` when the name is longer than 50 characters, the list does
    /// not exist, or it already has a group with the same name (ignoring
    /// case). These checks happen before the group is created.
    pub fn create_group(&self, list_id: i64, name: &str) -> Result<Group> {
        if name.chars().count() > MAX_GROUP_NAME_LENGTH {
            return Err(MailUpError::validation(format!(
                "Maximum length of a group name is {MAX_GROUP_NAME_LENGTH} characters"
            )));
        }

        let lists = self.get_lists_and_groups()?;
        let list = find_list(&lists, list_id)?;
        if let Some(existing) = list.group_named(name) {
            return Err(MailUpError::validation(format!(
                "A group named '{}' already exists in the list '{}'",
                existing.name, list.name
            )));
        }

        let (group_id, _) = self.import_call(
            "CreateGroup",
            &[
                ("idList", Value::from(list.id)),
                ("listGUID", Value::from(list.guid.as_str())),
                ("newGroupName", Value::from(name)),
            ],
        )?;

        info!(list_id, group_id, "Group created");
        Ok(Group { id: group_id, name: name.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use mailup_domain::MailUpError;
    use serde_json::json;

    use crate::service::testing::{fixture, import_reply, login_reply, nl_lists_reply, ok_reply};

    #[test]
    fn get_lists_normalizes_single_and_repeated_entries() {
        let mut fx = fixture();
        fx.procedure.reply("LoginFromId", login_reply("key-1"));
        fx.procedure.reply(
            "GetLists",
            ok_reply(json!({"lists": {"list": [
                {"listID": "1", "listName": "Main"},
                {"listID": "2", "listName": {}}
            ]}})),
        );

        let lists = fx.service.get_lists().unwrap();

        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].name, "Main");
        assert_eq!(lists[1].id, 2);
        assert_eq!(lists[1].name, "");
        assert_eq!(fx.procedure.calls()[1].arg("accessKey"), Some(json!("key-1")));
    }

    #[test]
    fn get_lists_and_groups_reads_attributes() {
        let fx = fixture();
        fx.procedure.reply("GetNlLists", nl_lists_reply());

        let lists = fx.service.get_lists_and_groups().unwrap();

        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].guid, "guid-10");
        assert_eq!(lists[0].groups.len(), 3);
        assert_eq!(lists[0].groups[2].name, "Partners");
        assert!(lists[1].groups.is_empty());

        let call = &fx.procedure.calls()[0];
        let header = call.header.as_ref().unwrap();
        assert_eq!(header.user, "a1234");
        assert_eq!(header.enc_type, "UTF-8");
    }

    #[test]
    fn create_group_returns_new_id() {
        let fx = fixture();
        fx.procedure.reply("GetNlLists", nl_lists_reply());
        fx.procedure.reply("CreateGroup", import_reply(42, json!({})));

        let group = fx.service.create_group(10, "Leads").unwrap();

        assert_eq!(group.id, 42);
        let call = fx.procedure.calls().pop().unwrap();
        assert_eq!(call.arg("listGUID"), Some(json!("guid-10")));
        assert_eq!(call.arg("newGroupName"), Some(json!("Leads")));
    }

    #[test]
    fn create_group_rejects_duplicates_case_insensitively() {
        let fx = fixture();
        fx.procedure.reply("GetNlLists", nl_lists_reply());

        let err = fx.service.create_group(10, "CUSTOMERS").unwrap_err();

        assert_eq!(err.to_string(), "A group named 'Customers' already exists in the list 'Newsletter'");
        assert_eq!(fx.procedure.methods(), vec!["GetNlLists"]);
    }

    #[test]
    fn create_group_checks_length_before_any_call() {
        let fx = fixture();
        let err = fx.service.create_group(10, &"x".repeat(51)).unwrap_err();
        assert!(matches!(err, MailUpError::Validation(_)));
        assert!(fx.procedure.calls().is_empty());
    }

    #[test]
    fn create_group_on_unknown_list() {
        let fx = fixture();
        fx.procedure.reply("GetNlLists", nl_lists_reply());
        let err = fx.service.create_group(99, "Leads").unwrap_err();
        assert_eq!(err.to_string(), "Unable to find the list with id 99");
    }

    #[test]
    fn remote_group_error_uses_catalog() {
        let fx = fixture();
        fx.procedure.reply("GetNlLists", nl_lists_reply());
        fx.procedure.reply("CreateGroup", import_reply(-303, json!({})));

        let err = fx.service.create_group(10, "Leads").unwrap_err();

        assert_eq!(err.to_string(), "The group already exists.");
    }
}
