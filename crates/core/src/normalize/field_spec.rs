//! Field declarations for the response normalizer
//!
//! A declaration is a `(source, token)` pair such as `("@idList",
//! "integer>id")`: a leading `@` marks an attribute, the token names the
//! type and an optional `>alias` renames the field.

use std::str::FromStr;

use mailup_domain::{MailUpError, Result};

/// Coercion applied to one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Boolean,
    Timestamp,
    /// Passed through as found
    Untyped,
}

impl FromStr for FieldType {
    type Err = MailUpError;

    fn from_str(token: &str) -> Result<Self> {
        match token {
            "string" => Ok(Self::String),
            "integer" | "int" => Ok(Self::Integer),
            "boolean" | "bool" => Ok(Self::Boolean),
            "timestamp" | "datetime" => Ok(Self::Timestamp),
            "" => Ok(Self::Untyped),
            other => Err(MailUpError::validation(format!("Unknown field type: {other}"))),
        }
    }
}

/// One parsed field declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Element or attribute name, without the `@` sentinel
    pub source: String,
    pub attribute: bool,
    pub field_type: FieldType,
    pub alias: Option<String>,
}

impl FieldSpec {
    /// Parse a single declaration.
    ///
    /// # Errors
    /// Returns `MailUpError::Validation` for an unknown type token.
    pub fn parse(source: &str, token: &str) -> Result<Self> {
        let (type_token, alias) = match token.split_once('>') {
            Some((ty, alias)) => (ty, Some(alias.to_string()).filter(|a| !a.is_empty())),
            None => (token, None),
        };

        let (source, attribute) = match source.strip_prefix('@') {
            Some(name) => (name, true),
            None => (source, false),
        };

        Ok(Self {
            source: source.to_string(),
            attribute,
            field_type: type_token.parse()?,
            alias,
        })
    }

    /// Name of the field in the normalized output.
    pub fn target(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.source)
    }
}

/// Parse an ordered list of declarations.
pub fn field_specs(declarations: &[(&str, &str)]) -> Result<Vec<FieldSpec>> {
    declarations.iter().map(|(source, token)| FieldSpec::parse(source, token)).collect()
}
