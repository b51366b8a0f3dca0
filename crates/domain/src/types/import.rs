//! Subscriber import: input shapes, options and process details

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{MailUpError, Result};

/* -------------------------------------------------------------------------- */
/* Options */
/* -------------------------------------------------------------------------- */

/// Which channel(s) an import feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportChannel {
    Email,
    Sms,
    EmailAndSms,
}

impl ImportChannel {
    /// Wire code of the import service.
    pub fn code(self) -> i64 {
        match self {
            Self::Email => 1,
            Self::Sms => 2,
            Self::EmailAndSms => 3,
        }
    }
}

/// How mobile numbers are laid out in the import document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobileInputType {
    /// Prefix and number in one field
    Merged,
    /// Separate prefix and number fields
    PrefixAndNumber,
}

impl MobileInputType {
    pub fn code(self) -> i64 {
        match self {
            Self::Merged => 1,
            Self::PrefixAndNumber => 2,
        }
    }
}

/// Options for a new import process. `None` means "guess from the data".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    pub channel: Option<ImportChannel>,
    pub mobile_input_type: Option<MobileInputType>,
    /// Subscribe recipients as pending
    pub as_pending: bool,
    /// Import recipients as unsubscribed
    pub as_opt_out: bool,
    pub force_opt_in: bool,
    pub replace_groups: bool,
    /// Send a confirmation request email
    pub confirm_email: bool,
    /// Newsletter used for the confirmation request; generated when absent
    pub confirm_newsletter_id: Option<i64>,
}

/* -------------------------------------------------------------------------- */
/* Input */
/* -------------------------------------------------------------------------- */

/// Structured subscriber record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberFields {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub prefix: Option<String>,
    pub name: Option<String>,
    /// Custom field id to value
    #[serde(default)]
    pub custom: BTreeMap<u32, String>,
}

impl SubscriberFields {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn custom(mut self, id: u32, value: impl Into<String>) -> Self {
        self.custom.insert(id, value.into());
        self
    }

    /// A record with no key at all. Keys set to an empty string still count.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.phone.is_none()
            && self.prefix.is_none()
            && self.name.is_none()
            && self.custom.is_empty()
    }
}

/// One element of a heterogeneous import batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    /// Bare email address or phone number
    Line(String),
    Fields(SubscriberFields),
}

impl RawRecord {
    /// Build a structured record from `(key, value)` pairs.
    ///
    /// Recognized keys are `email`, `phone`, `prefix`, `name` and numeric
    /// custom field ids.
    ///
    /// # Errors
    /// Returns `MailUpError::Validation` for any other key.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut fields = SubscriberFields::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.into();
            match key {
                "email" => fields.email = Some(value),
                "phone" => fields.phone = Some(value),
                "prefix" => fields.prefix = Some(value),
                "name" => fields.name = Some(value),
                other => match other.trim().parse::<u32>() {
                    Ok(id) => {
                        fields.custom.insert(id, value);
                    }
                    Err(_) => {
                        return Err(MailUpError::validation(format!(
                            "Unknown property name: {other}"
                        )))
                    }
                },
            }
        }
        Ok(Self::Fields(fields))
    }
}

impl From<SubscriberFields> for RawRecord {
    fn from(fields: SubscriberFields) -> Self {
        Self::Fields(fields)
    }
}

impl From<&str> for RawRecord {
    fn from(line: &str) -> Self {
        Self::Line(line.to_string())
    }
}

impl From<String> for RawRecord {
    fn from(line: String) -> Self {
        Self::Line(line)
    }
}

impl TryFrom<&Value> for RawRecord {
    type Error = MailUpError;

    /// JSON strings become lines, objects become structured records. Scalar
    /// values are rendered as text; `null` becomes an empty string.
    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(line) => Ok(Self::Line(line.clone())),
            Value::Object(map) => Self::from_pairs(map.iter().map(|(k, v)| {
                let text = match v {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (k.as_str(), text)
            })),
            _ => Err(MailUpError::validation("Invalid type of data parameter")),
        }
    }
}

/// Loosely shaped import data, resolved once into [`ImportItem`]s
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportInput {
    /// One bare value per element
    RawLines(Vec<String>),
    /// Mix of bare values and structured records
    RawRecords(Vec<RawRecord>),
}

impl ImportInput {
    /// Split newline-delimited text (`\n`, `\r\n` or `\r`) into lines.
    pub fn from_text(text: &str) -> Self {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        Self::RawLines(normalized.split('\n').map(str::to_string).collect())
    }

    /// Build an input from a JSON string or array.
    ///
    /// # Errors
    /// Returns `MailUpError::Validation` for any other JSON shape or an
    /// unknown record key.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(Self::from_text(text)),
            Value::Array(items) => Ok(Self::RawRecords(
                items.iter().map(RawRecord::try_from).collect::<Result<Vec<_>>>()?,
            )),
            _ => Err(MailUpError::validation("Invalid type of data parameter")),
        }
    }
}

impl From<&str> for ImportInput {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl From<Vec<String>> for ImportInput {
    fn from(lines: Vec<String>) -> Self {
        Self::RawLines(lines)
    }
}

impl From<Vec<&str>> for ImportInput {
    fn from(lines: Vec<&str>) -> Self {
        Self::RawLines(lines.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<RawRecord>> for ImportInput {
    fn from(records: Vec<RawRecord>) -> Self {
        Self::RawRecords(records)
    }
}

impl From<Vec<SubscriberFields>> for ImportInput {
    fn from(records: Vec<SubscriberFields>) -> Self {
        Self::RawRecords(records.into_iter().map(RawRecord::Fields).collect())
    }
}

/// Group ids to subscribe imported recipients to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSelection {
    Ids(Vec<i64>),
    /// Comma-separated ids, as typed by a user
    Csv(String),
}

impl Default for GroupSelection {
    fn default() -> Self {
        Self::Ids(Vec::new())
    }
}

impl From<i64> for GroupSelection {
    fn from(id: i64) -> Self {
        Self::Ids(vec![id])
    }
}

impl From<Vec<i64>> for GroupSelection {
    fn from(ids: Vec<i64>) -> Self {
        Self::Ids(ids)
    }
}

impl From<&[i64]> for GroupSelection {
    fn from(ids: &[i64]) -> Self {
        Self::Ids(ids.to_vec())
    }
}

impl From<&str> for GroupSelection {
    fn from(csv: &str) -> Self {
        Self::Csv(csv.to_string())
    }
}

impl From<String> for GroupSelection {
    fn from(csv: String) -> Self {
        Self::Csv(csv)
    }
}

/// Normalized subscriber record, ready for serialization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportItem {
    pub email: Option<String>,
    pub prefix: Option<String>,
    pub number: Option<String>,
    pub name: Option<String>,
    pub custom_fields: BTreeMap<u32, String>,
}

/* -------------------------------------------------------------------------- */
/* Process */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportStatus {
    NotStarted,
    Running,
    Completed,
    Failed,
    Other(i64),
}

impl ImportStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::NotStarted,
            2 => Self::Running,
            3 => Self::Completed,
            4 => Self::Failed,
            other => Self::Other(other),
        }
    }
}

/// Server-side import job, as reported by `GetProcessDetails`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProcess {
    pub id: Option<i64>,
    /// Seconds since the UNIX epoch
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub total_contacts: Option<i64>,
    pub new_email: Option<i64>,
    pub existing_email: Option<i64>,
    pub opt_out_email: Option<i64>,
    pub new_mobile: Option<i64>,
    pub existing_mobile: Option<i64>,
    pub opt_out_mobile: Option<i64>,
    pub status: Option<ImportStatus>,
    pub running: Option<bool>,
    pub confirmation_email: Option<bool>,
    /// Passed through without interpretation
    pub confirmation_sent: Option<String>,
}
