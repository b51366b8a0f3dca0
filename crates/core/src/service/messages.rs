//! Messages and newsletter bodies

use mailup_domain::{Message, NewsletterCode, Result};
use serde_json::Value;

use super::MailUpService;
use crate::normalize::{descend, field_specs, normalize};
use crate::ports::ServiceName;

const MESSAGE_FIELDS: &[(&str, &str)] = &[
    ("newsletterID", "integer>id"),
    ("subject", "string"),
    ("note", "string"),
    ("creationdate", "timestamp>creationDate"),
];

impl MailUpService {
    /// Newsletters and SMS messages of a list.
    pub fn get_messages(&mut self, list_id: i64) -> Result<Vec<Message>> {
        self.list_messages("GetMessages", list_id)
    }

    /// Newsletters of a list.
    pub fn get_newsletters(&mut self, list_id: i64) -> Result<Vec<Message>> {
        self.list_messages("GetNewsletters", list_id)
    }

    /// Subject, header and body of a newsletter.
    ///
    /// Returns `None` when subject, body and code are all empty, which is
    /// how the service reports an unknown newsletter.
    pub fn get_newsletter_code(
        &mut self,
        list_id: i64,
        newsletter_id: i64,
    ) -> Result<Option<NewsletterCode>> {
        let key = self.required_access_key()?;
        let reply = self.send(
            ServiceName::Send,
            "GetNewsletterCode",
            &[
                ("accessKey", Value::from(key)),
                ("listID", Value::from(list_id)),
                ("newsletterID", Value::from(newsletter_id)),
                ("isTemplate", Value::from(false)),
            ],
        )?;

        let fields = normalize(
            &reply,
            &field_specs(&[
                ("newsletterSubject", "string>subject"),
                ("newsletterHeader", "string>header"),
                ("newsletterBody", "string>body"),
                ("newsletterCode", "string>code"),
            ])?,
        );
        let code = NewsletterCode {
            subject: fields.text("subject"),
            header: fields.text("header"),
            body: fields.text("body"),
            code: fields.text("code"),
        };

        if code.subject.is_empty() && code.body.is_empty() && code.code.is_empty() {
            return Ok(None);
        }
        Ok(Some(code))
    }

    fn list_messages(&mut self, method: &str, list_id: i64) -> Result<Vec<Message>> {
        let key = self.required_access_key()?;
        let reply = self.send(
            ServiceName::Send,
            method,
            &[("accessKey", Value::from(key)), ("listID", Value::from(list_id))],
        )?;

        let specs = field_specs(MESSAGE_FIELDS)?;
        Ok(descend(&reply, &["list", "newsletters", "newsletter"])
            .into_iter()
            .map(|node| {
                let fields = normalize(node, &specs);
                Message {
                    id: fields.int("id"),
                    subject: fields.text("subject"),
                    note: fields.text("note"),
                    creation_date: fields.int("creationDate"),
                }
            })
            .collect())
    }
}
