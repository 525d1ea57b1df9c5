use formkit_rules::RuleError;
use formkit_schema::SchemaError;
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A reorder index is outside `[0, len)`.
    #[error("index {index} is out of range for {len} fields")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Any error the editing session can report.
#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Rules(#[from] RuleError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
