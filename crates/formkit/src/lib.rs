#![forbid(unsafe_code)]

//! formkit public facade.
//!
//! One dependency for building form editors:
//!
//! - [`schema`]: the field model and the JSON document format.
//! - [`rules`]: validation rules derived from fields, and value checking.
//! - [`runtime`] (feature `runtime`, on by default): the reactive field
//!   store, undo/redo history, and the editing session.
//!
//! ```
//! use formkit::prelude::*;
//!
//! let session = FormSession::default();
//! let id = session.store().add_field(
//!     FieldType::Text,
//!     Some(FieldPatch::new().with_validation(ValidationConfig::new().with_min_length(5))),
//! );
//! let rules = session.rules_for(id.as_str()).unwrap().unwrap();
//! assert!(rules.check(&FieldValue::text("abcd")).is_err());
//! ```

pub use formkit_rules as rules;
pub use formkit_schema as schema;

#[cfg(feature = "runtime")]
pub use formkit_runtime as runtime;

pub use formkit_rules::{FieldValue, RuleError, RuleSet, derive_rules};
pub use formkit_schema::{Field, FieldId, FieldType, FormDocument, SchemaError};

#[cfg(feature = "runtime")]
pub use formkit_runtime::{FieldStore, FormError, FormSession, HistoryTracker, StoreError};

/// Everything an editor usually needs, in one import.
pub mod prelude {
    pub use formkit_rules::{
        FieldError, FieldValue, RuleCache, RuleError, RuleKind, RuleSet, SubmissionReport,
        Violation, derive_rules, validate_submission,
    };
    pub use formkit_schema::{
        Field, FieldId, FieldKind, FieldOption, FieldPatch, FieldType, FormDocument, SchemaError,
        ValidationConfig,
    };

    #[cfg(feature = "runtime")]
    pub use formkit_runtime::{
        Binding, FieldStore, FormError, FormSession, HistoryCommand, HistoryConfig,
        HistoryTracker, SessionConfig, Snapshot, StoreError, Subscription,
    };
}
