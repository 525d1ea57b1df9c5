use formkit_schema::FieldId;
use thiserror::Error;

/// Errors from rule derivation.
#[derive(Debug, Clone, Error)]
pub enum RuleError {
    /// `validation.pattern` does not compile as a regular expression.
    #[error("field `{field_id}` has an invalid pattern `{pattern}`")]
    InvalidPattern {
        field_id: FieldId,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
