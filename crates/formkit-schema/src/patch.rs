//! Staged field edits.

use crate::field::{Field, FieldKind, FieldOption};
use crate::validation::ValidationConfig;

/// A set of attribute changes applied to a field in one shallow merge.
///
/// Every member is optional; `None` leaves the attribute as it is. A
/// configuration panel typically starts from [`FieldPatch::from_field`],
/// edits the copy, and commits it with a single store update. `options`
/// replaces the whole list; omitting it keeps the current options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<FieldOption>>,
    pub validation: Option<ValidationConfig>,
    pub collapsed: Option<bool>,
    pub fields: Option<Vec<Field>>,
}

impl FieldPatch {
    /// An empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage every editable attribute of `field`.
    ///
    /// Applying the result to the same field leaves it unchanged. Nested
    /// section children are not staged; they are edited through their own ids.
    #[must_use]
    pub fn from_field(field: &Field) -> Self {
        let mut patch = Self::new().with_label(field.label.clone());
        match &field.kind {
            FieldKind::Section(section) => {
                patch.collapsed = Some(section.collapsed);
            }
            FieldKind::Button => {}
            _ => {
                patch.placeholder = field.placeholder().map(str::to_owned);
                patch.required = Some(field.required_flag());
                patch.options = field.options().map(<[FieldOption]>::to_vec);
                patch.validation = Some(field.validation());
            }
        }
        patch
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }

    #[must_use]
    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = Some(validation);
        self
    }

    #[must_use]
    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = Some(collapsed);
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Append a generated option (`Option n`) to the staged list, starting
    /// from the field's current options when none are staged yet.
    pub fn push_numbered_option(&mut self, field: &Field) {
        let options = self
            .options
            .get_or_insert_with(|| field.options().map(<[FieldOption]>::to_vec).unwrap_or_default());
        let next = FieldOption::numbered(options.len() + 1);
        options.push(next);
    }

    /// Remove the staged option at `index`; out-of-range indices are ignored.
    pub fn remove_option(&mut self, index: usize) {
        if let Some(options) = self.options.as_mut() {
            if index < options.len() {
                options.remove(index);
            }
        }
    }
}
