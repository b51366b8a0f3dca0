//! SOAP 1.1 envelopes
//!
//! Requests are document/literal: one element per operation, one child per
//! argument, arguments rendered as text. The reply of `Method` carries the
//! actual document as escaped text inside `MethodResult`.

use std::io::Cursor;

use mailup_core::AuthenticationHeader;
use mailup_domain::{MailUpError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::Value;

use super::services::IMPORT_NAMESPACE;
use crate::errors::infra;

const SOAP_ENV: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Text form of an argument value.
pub fn render_argument(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn text_element(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name))).map_err(infra)?;
    writer.write_event(Event::Text(BytesText::new(text))).map_err(infra)?;
    writer.write_event(Event::End(BytesEnd::new(name))).map_err(infra)?;
    Ok(())
}

/// Build the request envelope for `method` in `namespace`.
pub fn request(
    namespace: &str,
    method: &str,
    args: &[(&str, Value)],
    header: Option<&AuthenticationHeader>,
) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(infra)?;
    writer
        .write_event(Event::Start(BytesStart::new("soap:Envelope").with_attributes([("xmlns:soap", SOAP_ENV)])))
        .map_err(infra)?;

    if let Some(header) = header {
        writer.write_event(Event::Start(BytesStart::new("soap:Header"))).map_err(infra)?;
        writer
            .write_event(Event::Start(
                BytesStart::new("Authentication").with_attributes([("xmlns", IMPORT_NAMESPACE)]),
            ))
            .map_err(infra)?;
        text_element(&mut writer, "User", &header.user)?;
        text_element(&mut writer, "Password", &header.password)?;
        text_element(&mut writer, "encType", &header.enc_type)?;
        writer.write_event(Event::End(BytesEnd::new("Authentication"))).map_err(infra)?;
        writer.write_event(Event::End(BytesEnd::new("soap:Header"))).map_err(infra)?;
    }

    writer.write_event(Event::Start(BytesStart::new("soap:Body"))).map_err(infra)?;
    writer
        .write_event(Event::Start(BytesStart::new(method).with_attributes([("xmlns", namespace)])))
        .map_err(infra)?;
    for (name, value) in args {
        text_element(&mut writer, name, &render_argument(value))?;
    }
    writer.write_event(Event::End(BytesEnd::new(method))).map_err(infra)?;
    writer.write_event(Event::End(BytesEnd::new("soap:Body"))).map_err(infra)?;
    writer.write_event(Event::End(BytesEnd::new("soap:Envelope"))).map_err(infra)?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| MailUpError::Transport(format!("SOAP request is not UTF-8: {e}")))
}

/// Text content of the first element whose local name is `name`.
fn element_text(xml: &str, name: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut inside = false;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(infra)? {
            Event::Start(ref e) if e.local_name().as_ref() == name.as_bytes() => inside = true,
            Event::Empty(ref e) if e.local_name().as_ref() == name.as_bytes() => {
                return Ok(Some(String::new()));
            }
            Event::Text(ref e) if inside => text.push_str(&e.unescape().map_err(infra)?),
            Event::CData(e) if inside => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::End(ref e) if inside && e.local_name().as_ref() == name.as_bytes() => {
                return Ok(Some(text));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

/// The document embedded in the `{method}Result` element of a reply.
///
/// # Errors
/// `MalformedReply` when the element is missing or empty.
pub fn result_document(reply: &str, method: &str) -> Result<String> {
    let field = format!("{method}Result");
    match element_text(reply, &field)? {
        Some(text) if !text.trim().is_empty() => Ok(text),
        Some(_) => Err(MailUpError::MalformedReply(format!("Empty {field} in reply"))),
        None => Err(MailUpError::MalformedReply(format!("Missing {field} in reply"))),
    }
}

/// `faultstring` of a SOAP fault, if the reply is one.
pub fn fault_string(reply: &str) -> Option<String> {
    element_text(reply, "faultstring").ok().flatten().map(|s| s.trim().to_string())
}
