//! XML document to tree conversion
//!
//! The tree mirrors the document below its root element:
//! - attributes go under `@attributes`
//! - a child element becomes a key; repeated children become an array
//! - an element with only text becomes a string
//! - an element with neither text nor content becomes `{}`
//! - text mixed with child elements goes under `#text`
//!
//! Surrounding whitespace of text nodes is dropped.

use mailup_core::normalize::{ATTRIBUTES, TEXT};
use mailup_domain::{MailUpError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::errors::infra;

struct Frame {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(element: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(element.local_name().into_inner()).into_owned();

        let mut attributes = Map::new();
        for attr in element.attributes() {
            let attr = attr.map_err(|e| MailUpError::MalformedReply(format!("Invalid XML attribute: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.local_name().into_inner()).into_owned();
            let value = attr.unescape_value().map_err(infra)?.into_owned();
            attributes.insert(key, Value::String(value));
        }

        let mut fields = Map::new();
        if !attributes.is_empty() {
            fields.insert(ATTRIBUTES.to_string(), Value::Object(attributes));
        }
        Ok(Self { name, fields, text: String::new() })
    }

    fn close(self) -> (String, Value) {
        let value = if self.fields.is_empty() {
            if self.text.is_empty() {
                Value::Object(Map::new())
            } else {
                Value::String(self.text)
            }
        } else {
            let mut fields = self.fields;
            if !self.text.is_empty() {
                fields.insert(TEXT.to_string(), Value::String(self.text));
            }
            Value::Object(fields)
        };
        (self.name, value)
    }
}

fn attach(parent: &mut Map<String, Value>, name: String, value: Value) {
    match parent.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.insert(name, value);
        }
    }
}

/// Parse `xml` and return the tree of its root element.
///
/// # Errors
/// `MalformedReply` for syntax errors, an unbalanced document or a document
/// without any element.
pub fn parse(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(infra)? {
            Event::Start(ref e) => stack.push(Frame::open(e)?),
            Event::Empty(ref e) => {
                let (name, value) = Frame::open(e)?.close();
                match stack.last_mut() {
                    Some(parent) => attach(&mut parent.fields, name, value),
                    None => root = Some(value),
                }
            }
            Event::Text(ref e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&e.unescape().map_err(infra)?);
                }
            }
            Event::CData(e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| MailUpError::MalformedReply("Unbalanced XML document".into()))?;
                let (name, value) = frame.close();
                match stack.last_mut() {
                    Some(parent) => attach(&mut parent.fields, name, value),
                    None => root = Some(value),
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(MailUpError::MalformedReply("Truncated XML document".into()));
    }
    root.ok_or_else(|| MailUpError::MalformedReply("Empty XML document".into()))
}
