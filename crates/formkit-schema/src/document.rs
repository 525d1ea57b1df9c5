//! The export/import unit.
//!
//! # Accepted shapes
//!
//! | Input | Result |
//! |-------|--------|
//! | `{"title": .., "description": .., "fields": [..]}` | as given; non-string title/description read as `""` |
//! | `[..]` (legacy) | `fields` = the array, empty title and description |
//! | anything else | [`SchemaError::InvalidDocument`] |
//!
//! # Invariants
//!
//! 1. A parsed document never contains two fields with the same id, at any
//!    nesting depth.
//! 2. Parsing is all-or-nothing: one malformed field rejects the document.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::error::SchemaError;
use crate::field::Field;

/// Title, description, and ordered fields of one form.
///
/// Read documents with [`FormDocument::from_json`] or
/// [`FormDocument::from_value`]; both accept the legacy shape and check id
/// uniqueness.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormDocument {
    pub title: String,
    pub description: String,
    pub fields: Vec<Field>,
}

impl FormDocument {
    /// A document with the given fields and empty title/description.
    #[must_use]
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| SchemaError::invalid_document(format!("not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Parse a document from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        let (title, description, fields) = match value {
            Value::Array(items) => (String::new(), String::new(), items),
            Value::Object(mut map) => {
                let Some(Value::Array(items)) = map.remove("fields") else {
                    return Err(SchemaError::invalid_document(
                        "expected an array of fields or an object with a `fields` array",
                    ));
                };
                let text = |v: Option<Value>| match v {
                    Some(Value::String(s)) => s,
                    _ => String::new(),
                };
                (text(map.remove("title")), text(map.remove("description")), items)
            }
            _ => {
                return Err(SchemaError::invalid_document(
                    "expected an array of fields or an object with a `fields` array",
                ));
            }
        };

        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<Field>(item).map_err(|e| {
                    SchemaError::invalid_document(format!("field #{index}: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        check_unique_ids(&fields)?;

        Ok(Self {
            title,
            description,
            fields,
        })
    }

    /// Encode as a JSON value.
    pub fn to_value(&self) -> Result<Value, SchemaError> {
        serde_json::to_value(self).map_err(SchemaError::Encode)
    }

    /// Encode as indented JSON text, the export format.
    pub fn to_json_pretty(&self) -> Result<String, SchemaError> {
        serde_json::to_string_pretty(self).map_err(SchemaError::Encode)
    }

    /// Every field in document order, section children after their section.
    #[must_use]
    pub fn all_fields(&self) -> Vec<&Field> {
        let mut out = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            field.walk(&mut |f| out.push(f));
        }
        out
    }
}

fn check_unique_ids(fields: &[Field]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    let mut duplicate = None;
    for field in fields {
        field.walk(&mut |f| {
            if duplicate.is_none() && !seen.insert(f.id().as_str()) {
                duplicate = Some(f.id().to_string());
            }
        });
    }
    match duplicate {
        Some(id) => Err(SchemaError::invalid_document(format!(
            "duplicate field id `{id}`"
        ))),
        None => Ok(()),
    }
}
