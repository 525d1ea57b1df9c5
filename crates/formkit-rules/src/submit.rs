//! Submit-time validation of a whole form.

use std::collections::HashMap;

use formkit_schema::{Field, FieldId, FieldType};

use crate::derive::derive_rules;
use crate::error::RuleError;
use crate::rule::RuleKind;
use crate::value::FieldValue;

/// One failed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field_id: FieldId,
    pub kind: RuleKind,
    pub message: String,
}

/// Outcome of [`validate_submission`], errors in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    errors: Vec<FieldError>,
}

impl SubmissionReport {
    /// Whether every checked field passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// The error reported for `id`, if any.
    #[must_use]
    pub fn error_for(&self, id: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field_id == *id)
    }

    #[must_use]
    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

/// Check `values` against the rules of every input field.
///
/// Top-level fields and the direct children of sections are checked; deeper
/// nesting is not rendered by form runtimes and is skipped. Sections and
/// buttons carry no value. A field missing from `values` is treated as
/// empty. At most one error is reported per field.
pub fn validate_submission(
    fields: &[Field],
    values: &HashMap<FieldId, FieldValue>,
) -> Result<SubmissionReport, RuleError> {
    let mut report = SubmissionReport::default();

    let visible = fields
        .iter()
        .flat_map(|f| std::iter::once(f).chain(f.children()));

    for field in visible.filter(|f| f.field_type().is_input()) {
        let rules = derive_rules(field)?;
        let empty;
        let value = match values.get(field.id()) {
            Some(value) => value,
            None => {
                empty = empty_value(field.field_type());
                &empty
            }
        };
        if let Err(violation) = rules.check(value) {
            report.errors.push(FieldError {
                field_id: field.id().clone(),
                kind: violation.kind,
                message: violation.message,
            });
        }
    }

    Ok(report)
}

fn empty_value(ty: FieldType) -> FieldValue {
    match ty {
        FieldType::Checkbox => FieldValue::Checked(Vec::new()),
        _ => FieldValue::default(),
    }
}
