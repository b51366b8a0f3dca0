//! Import process lifecycle

use mailup_domain::{
    GroupSelection, ImportInput, ImportOptions, ImportProcess, ImportStatus, List, MailUpError,
    Result,
};
use serde_json::Value;
use tracing::info;

use super::MailUpService;
use crate::import::{find_list, join_ids, resolve_batch, resolve_groups, subscribers_document};
use crate::normalize::{child, field_specs, normalize};

const PROCESS_FIELDS: &[(&str, &str)] = &[
    ("@idProcess", "integer>id"),
    ("StartDate", "timestamp>startDate"),
    ("EndDate", "timestamp>endDate"),
    ("TotalContacts", "integer>totalContacts"),
    ("NewEmail", "integer>newEmail"),
    ("ExistingEmail", "integer>existingEmail"),
    ("OptOutEmail", "integer>optOutEmail"),
    ("NewMobile", "integer>newMobile"),
    ("ExistingMobile", "integer>existingMobile"),
    ("OptOutMobile", "integer>optOutMobile"),
    ("StatusCode", "integer>status"),
    ("IsRunning", "boolean>running"),
    ("ConfirmationEmail", "boolean>confirmationEmail"),
    ("ConfirmationSent", ">confirmationSent"),
];

fn list_args(list: &List) -> [(&'static str, Value); 2] {
    [("idList", Value::from(list.id)), ("listGUID", Value::from(list.guid.as_str()))]
}

impl MailUpService {
    /// Create an import process for `input` in `list_id`; returns its id.
    ///
    /// The batch is resolved locally first; the list and every group are then
    /// checked against a fresh catalog before the process is created.
    ///
    /// # Errors
    /// `Validation` for an unknown list or group, an invalid confirmation
    /// newsletter id, or input whose channel cannot be decided.
    pub fn new_import_process(
        &self,
        list_id: i64,
        groups: impl Into<GroupSelection>,
        input: impl Into<ImportInput>,
        options: &ImportOptions,
    ) -> Result<i64> {
        let confirm_newsletter_id = match options.confirm_newsletter_id {
            Some(id) if id < 0 => {
                return Err(MailUpError::validation(format!(
                    "Invalid confirmation newsletter id: {id}"
                )))
            }
            Some(id) => id,
            None => 0,
        };

        let batch = resolve_batch(input.into(), options)?;
        let document = subscribers_document(&batch.items, &batch.custom_field_ids)?;

        let lists = self.get_lists_and_groups()?;
        let list = find_list(&lists, list_id)?;
        let group_ids = resolve_groups(list, &groups.into())?;

        let [id_list, list_guid] = list_args(list);
        let (process_id, _) = self.import_call(
            "NewImportProcess",
            &[
                id_list,
                list_guid,
                ("idGroups", Value::from(join_ids(&group_ids))),
                ("importType", Value::from(batch.channel.code())),
                ("mobileInputType", Value::from(batch.mobile_input_type.code())),
                ("asPending", Value::from(options.as_pending)),
                ("asOptOut", Value::from(options.as_opt_out)),
                ("forceOptIn", Value::from(options.force_opt_in)),
                ("replaceGroups", Value::from(options.replace_groups)),
                ("ConfirmEmail", Value::from(options.confirm_email)),
                ("idConfirmNL", Value::from(confirm_newsletter_id)),
                ("xmlDoc", Value::from(document)),
            ],
        )?;

        info!(
            list_id,
            process_id,
            records = batch.items.len(),
            channel = ?batch.channel,
            "Import process created"
        );
        Ok(process_id)
    }

    /// Start a previously created import process.
    pub fn start_import_process(&self, list_id: i64, process_id: i64) -> Result<()> {
        let lists = self.get_lists_and_groups()?;
        let list = find_list(&lists, list_id)?;

        let [id_list, list_guid] = list_args(list);
        self.import_call("StartProcess", &[id_list, list_guid, ("idProcess", Value::from(process_id))])?;

        info!(list_id, process_id, "Import process started");
        Ok(())
    }

    /// Counters and state of an import process.
    pub fn get_import_process_details(&self, list_id: i64, process_id: i64) -> Result<ImportProcess> {
        let lists = self.get_lists_and_groups()?;
        let list = find_list(&lists, list_id)?;

        let [id_list, list_guid] = list_args(list);
        let (_, body) = self.import_call(
            "GetProcessDetails",
            &[id_list, list_guid, ("idProcess", Value::from(process_id))],
        )?;

        let node = child(&body, "ImportProcess")
            .ok_or_else(|| MailUpError::MalformedReply("Missing ImportProcess element".into()))?;
        let fields = normalize(node, &field_specs(PROCESS_FIELDS)?);

        Ok(ImportProcess {
            id: fields.int("id"),
            start_date: fields.int("startDate"),
            end_date: fields.int("endDate"),
            total_contacts: fields.int("totalContacts"),
            new_email: fields.int("newEmail"),
            existing_email: fields.int("existingEmail"),
            opt_out_email: fields.int("optOutEmail"),
            new_mobile: fields.int("newMobile"),
            existing_mobile: fields.int("existingMobile"),
            opt_out_mobile: fields.int("optOutMobile"),
            status: fields.int("status").map(ImportStatus::from_code),
            running: fields.flag("running"),
            confirmation_email: fields.flag("confirmationEmail"),
            confirmation_sent: fields.opt_text("confirmationSent"),
        })
    }
}
