//! Import document serialization
//!
//! ```text
//! <subscribers>
//!   <subscriber email=".." Prefix=".." Number=".." Name="..">
//!     <campo2>..</campo2><campo5>..</campo5>
//!   </subscriber>
//! </subscribers>
//! ```
//!
//! Every subscriber carries every custom field id of the batch, ascending,
//! empty where the record did not supply it.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::io::Cursor;

use mailup_domain::{ImportItem, MailUpError, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Serialize `items` into the document submitted as `xmlDoc`.
pub fn subscribers_document(items: &[ImportItem], custom_field_ids: &BTreeSet<u32>) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Start(BytesStart::new("subscribers"))).map_err(xml_error)?;
    for item in items {
        let subscriber = BytesStart::new("subscriber").with_attributes([
            ("email", item.email.as_deref().unwrap_or_default()),
            ("Prefix", item.prefix.as_deref().unwrap_or_default()),
            ("Number", item.number.as_deref().unwrap_or_default()),
            ("Name", item.name.as_deref().unwrap_or_default()),
        ]);
        writer.write_event(Event::Start(subscriber)).map_err(xml_error)?;

        for id in custom_field_ids {
            let tag = format!("campo{id}");
            let value = item.custom_fields.get(id).map_or("", String::as_str);
            writer.write_event(Event::Start(BytesStart::new(tag.as_str()))).map_err(xml_error)?;
            writer.write_event(Event::Text(BytesText::new(value))).map_err(xml_error)?;
            writer.write_event(Event::End(BytesEnd::new(tag.as_str()))).map_err(xml_error)?;
        }

        writer.write_event(Event::End(BytesEnd::new("subscriber"))).map_err(xml_error)?;
    }
    writer.write_event(Event::End(BytesEnd::new("subscribers"))).map_err(xml_error)?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| MailUpError::Transport(format!("Import document is not UTF-8: {e}")))
}

fn xml_error(err: impl Display) -> MailUpError {
    MailUpError::Transport(format!("Failed to write import document: {err}"))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn item(email: &str, custom: &[(u32, &str)]) -> ImportItem {
        ImportItem {
            email: Some(email.to_string()),
            custom_fields: custom.iter().map(|(id, v)| (*id, (*v).to_string())).collect::<BTreeMap<_, _>>(),
            ..ImportItem::default()
        }
    }

    #[test]
    fn every_record_gets_every_custom_field_ascending() {
        let items = vec![item("a@b.com", &[(5, "Rome")]), item("c@d.com", &[(2, "Ann")])];
        let ids: BTreeSet<u32> = [5, 2].into_iter().collect();

        let xml = subscribers_document(&items, &ids).unwrap();

        assert_eq!(
            xml,
            "<subscribers>\
             <subscriber email=\"a@b.com\" Prefix=\"\" Number=\"\" Name=\"\"><campo2></campo2><campo5>Rome</campo5></subscriber>\
             <subscriber email=\"c@d.com\" Prefix=\"\" Number=\"\" Name=\"\"><campo2>Ann</campo2><campo5></campo5></subscriber>\
             </subscribers>"
        );
    }

    #[test]
    fn values_are_escaped() {
        let items = vec![ImportItem {
            email: Some("a@b.com".into()),
            name: Some("Tom & \"Jerry\"".into()),
            custom_fields: [(1, "<b>".to_string())].into_iter().collect(),
            ..ImportItem::default()
        }];
        let ids: BTreeSet<u32> = [1].into_iter().collect();

        let xml = subscribers_document(&items, &ids).unwrap();

        assert!(xml.contains("Name=\"Tom &amp; &quot;Jerry&quot;\""));
        assert!(xml.contains("<campo1>&lt;b&gt;</campo1>"));
    }

    #[test]
    fn batch_without_custom_fields_has_no_children() {
        let xml = subscribers_document(&[item("a@b.com", &[])], &BTreeSet::new()).unwrap();
        assert_eq!(
            xml,
            "<subscribers><subscriber email=\"a@b.com\" Prefix=\"\" Number=\"\" Name=\"\"></subscriber></subscribers>"
        );
    }
}
