use std::path::PathBuf;

use formkit::{FormError, RuleError, SchemaError};
use thiserror::Error;

/// Errors reported by the `formkit` binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    #[error("invalid values file: {0}")]
    Values(String),

    #[error("invalid --field `{spec}`: {reason}")]
    FieldSpec { spec: String, reason: String },

    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("output failed: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// `1` is reserved for a completed validation that found errors.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Rules(_) | Self::Form(FormError::Rules(_)) => 3,
            _ => 2,
        }
    }
}
