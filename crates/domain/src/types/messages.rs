//! Messages, newsletter bodies and per-message reports

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A newsletter or SMS attached to a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Option<i64>,
    pub subject: String,
    pub note: String,
    /// Seconds since the UNIX epoch
    pub creation_date: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterCode {
    pub subject: String,
    pub header: String,
    pub body: String,
    pub code: String,
}

/// Click and open totals for one message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReport {
    pub click: ClickReport,
    pub open: OpenReport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickReport {
    /// Sum of the per-URL totals
    pub total: i64,
    pub urls: BTreeMap<String, UrlClicks>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlClicks {
    pub total: i64,
    /// Clicks per recipient email
    pub emails: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenReport {
    pub total: i64,
    /// Opens per recipient email
    pub emails: BTreeMap<String, i64>,
}
