//! Response normalizer
//!
//! Every reply, XML or JSON, reaches the client as a [`serde_json::Value`]
//! tree. XML replies use the conventions of the procedure transport:
//! attributes live under [`ATTRIBUTES`], repeated children become arrays,
//! text leaves are strings and empty elements are empty objects.
//!
//! [`normalize`] turns one node of such a tree into a flat [`Normalized`]
//! mapping according to a list of [`FieldSpec`]s. Fields not named by a spec
//! are kept as they are.

pub mod field_spec;

use mailup_common::time::parse_console_datetime;
use serde_json::{Map, Value};

pub use field_spec::{field_specs, FieldSpec, FieldType};

/// Key under which XML attributes are stored
pub const ATTRIBUTES: &str = "@attributes";

/// Key under which the text of a mixed-content XML element is stored
pub const TEXT: &str = "#text";

/// Flat mapping produced by [`normalize`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized(Map<String, Value>);

impl Normalized {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Integer value; `None` for null, missing or non-numeric text.
    pub fn int(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean value; `None` unless the field coerced to a boolean.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Text value; empty for null or missing, rendered for scalars.
    pub fn text(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// Text value, `None` when empty.
    pub fn opt_text(&self, key: &str) -> Option<String> {
        Some(self.text(key)).filter(|s| !s.is_empty())
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Normalize one reply node.
///
/// Missing fields are treated as empty. Per type:
/// * `string`: empty collections become `""`
/// * `integer`: empty becomes `null`, digit-only text an integer, anything
///   else is kept
/// * `boolean`: empty becomes `null`, `true`/`false` (any case) a boolean,
///   anything else is kept
/// * `timestamp`: console date/time text becomes epoch seconds, anything else
///   `null`
///
/// A renamed field is stored only under its alias. The attribute container is
/// removed once empty.
pub fn normalize(raw: &Value, specs: &[FieldSpec]) -> Normalized {
    let mut out = match raw {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    for spec in specs {
        let value = if spec.attribute {
            take_attribute(&mut out, &spec.source)
        } else if spec.alias.is_some() {
            out.remove(&spec.source)
        } else {
            out.get(&spec.source).cloned()
        };

        let value = coerce(value.unwrap_or_else(|| Value::String(String::new())), spec.field_type);
        out.insert(spec.target().to_string(), value);
    }

    if out.get(ATTRIBUTES).is_some_and(is_empty_collection) {
        out.remove(ATTRIBUTES);
    }

    Normalized(out)
}

fn take_attribute(out: &mut Map<String, Value>, name: &str) -> Option<Value> {
    out.get_mut(ATTRIBUTES).and_then(Value::as_object_mut).and_then(|attrs| attrs.remove(name))
}

fn is_empty_collection(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Null => true,
        _ => false,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        other => is_empty_collection(other),
    }
}

fn coerce(value: Value, field_type: FieldType) -> Value {
    match field_type {
        FieldType::Untyped => value,
        FieldType::String => {
            if is_empty_collection(&value) {
                Value::String(String::new())
            } else {
                value
            }
        }
        _ if is_blank(&value) => Value::Null,
        FieldType::Integer => match &value {
            Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                s.parse::<i64>().map_or(value.clone(), Value::from)
            }
            _ => value,
        },
        FieldType::Boolean => match &value {
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => value,
            },
            _ => value,
        },
        FieldType::Timestamp => match &value {
            Value::String(s) => parse_console_datetime(s).map_or(Value::Null, Value::from),
            _ => Value::Null,
        },
    }
}

/* -------------------------------------------------------------------------- */
/* Tree navigation */
/* -------------------------------------------------------------------------- */

/// First child named `name`.
pub fn child<'a>(node: &'a Value, name: &str) -> Option<&'a Value> {
    match node.get(name)? {
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

/// All children named `name`; a single child is a one-element list.
pub fn children<'a>(node: &'a Value, name: &str) -> Vec<&'a Value> {
    match node.get(name) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
        None => Vec::new(),
    }
}

/// Follow `path` through first children and return every node named by its
/// last segment.
pub fn descend<'a>(node: &'a Value, path: &[&str]) -> Vec<&'a Value> {
    let Some((last, parents)) = path.split_last() else {
        return vec![node];
    };
    parents
        .iter()
        .try_fold(node, |current, name| child(current, name))
        .map(|parent| children(parent, last))
        .unwrap_or_default()
}

/// Attribute text of an XML node; empty when absent.
pub fn attribute(node: &Value, name: &str) -> String {
    match node.get(ATTRIBUTES).and_then(|attrs| attrs.get(name)) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Text content of a leaf; empty for elements without text.
pub fn text(node: &Value) -> String {
    match node {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => match map.get(TEXT) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}
