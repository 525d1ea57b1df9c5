//! Errors produced while reading or writing form definitions.

use thiserror::Error;

/// Errors from schema parsing and serialization.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The input is not an array of fields or an object with a `fields` array,
    /// or one of its fields is malformed.
    #[error("invalid form document: {reason}")]
    InvalidDocument { reason: String },
    /// A `type` string outside the closed set of field types.
    #[error("unknown field type `{0}`")]
    UnknownFieldType(String),
    /// A field record that cannot be turned into a [`Field`](crate::Field).
    #[error("invalid field `{id}`: {reason}")]
    InvalidField { id: String, reason: String },
    /// Export failed while encoding JSON.
    #[error("failed to encode form document")]
    Encode(#[source] serde_json::Error),
}

impl SchemaError {
    pub(crate) fn invalid_document(reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            reason: reason.into(),
        }
    }
}
