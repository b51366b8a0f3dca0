//! Per-message click and open report

use mailup_domain::{MessageReport, Result, UrlClicks};
use serde_json::Value;

use super::MailUpService;
use crate::normalize::{attribute, child, children, ATTRIBUTES, TEXT};
use crate::ports::ServiceName;

/// Lenient integer: anything unparsable counts as zero.
fn count(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

/// Every child element of `node`, whatever its name.
fn element_children(node: &Value) -> Vec<&Value> {
    let Some(map) = node.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter(|(key, _)| key.as_str() != ATTRIBUTES && key.as_str() != TEXT)
        .flat_map(|(_, value)| match value {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .collect()
}

impl MailUpService {
    /// Click totals per URL and recipient, open totals per recipient.
    pub fn get_report_by_message(&mut self, list_id: i64, message_id: i64) -> Result<MessageReport> {
        let key = self.required_access_key()?;
        let reply = self.send(
            ServiceName::Report,
            "ReportByMessageEN",
            &[
                ("accessKey", Value::from(key)),
                ("listID", Value::from(list_id)),
                ("messageID", Value::from(message_id)),
            ],
        )?;

        let mut report = MessageReport::default();

        for clicks in children(&reply, "Clicks") {
            let total = count(&attribute(clicks, "Total"));
            let mut url = UrlClicks { total, ..UrlClicks::default() };
            for click in element_children(clicks) {
                url.emails.insert(attribute(click, "Email"), count(&attribute(click, "Total")));
            }
            report.click.total += total;
            report.click.urls.insert(attribute(clicks, "Url"), url);
        }

        if let Some(opens) = child(&reply, "Opens") {
            report.open.total = count(&attribute(opens, "Total"));
            for open in children(opens, "Open") {
                report.open.emails.insert(attribute(open, "Email"), count(&attribute(open, "Total")));
            }
        }

        Ok(report)
    }
}
