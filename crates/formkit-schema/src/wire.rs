//! Flat JSON record for [`Field`].
//!
//! The wire format is one loosely-typed object per field. Conversion into the
//! typed model drops attributes that do not apply to the field's type, so an
//! `options` array on a `text` field is read and discarded rather than
//! rejected. A missing `type` reads as `text`.

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::field::{Choice, Field, FieldKind, FieldOption, FieldType, Input, Section};
use crate::id::FieldId;
use crate::validation::{FieldRules, ValidationConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WireField {
    id: FieldId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    field_type: Option<FieldType>,
    #[serde(default)]
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    validation: Option<ValidationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<Field>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    collapsed: Option<bool>,
}

impl TryFrom<WireField> for Field {
    type Error = SchemaError;

    fn try_from(wire: WireField) -> Result<Self, Self::Error> {
        if wire.id.as_str().is_empty() {
            return Err(SchemaError::InvalidField {
                id: String::new(),
                reason: "id must not be empty".into(),
            });
        }

        let validation = wire.validation.unwrap_or_default();
        let placeholder = wire.placeholder.unwrap_or_default();
        let required = wire.required.unwrap_or(false);
        let options = wire.options.unwrap_or_default();

        let input = |placeholder: String| (placeholder, required);

        let kind = match wire.field_type.unwrap_or(FieldType::Text) {
            FieldType::Text => FieldKind::Text(typed_input(input(placeholder), &validation)),
            FieldType::Textarea => {
                FieldKind::Textarea(typed_input(input(placeholder), &validation))
            }
            FieldType::Number => FieldKind::Number(typed_input(input(placeholder), &validation)),
            FieldType::Email => FieldKind::Email(typed_input(input(placeholder), &validation)),
            FieldType::Otp => FieldKind::Otp(typed_input(input(placeholder), &validation)),
            FieldType::Select => {
                FieldKind::Select(typed_choice(input(placeholder), options, &validation))
            }
            FieldType::Radio => {
                FieldKind::Radio(typed_choice(input(placeholder), options, &validation))
            }
            FieldType::Checkbox => {
                FieldKind::Checkbox(typed_choice(input(placeholder), options, &validation))
            }
            FieldType::Section => FieldKind::Section(Section {
                fields: wire.fields.unwrap_or_default(),
                collapsed: wire.collapsed.unwrap_or(false),
            }),
            FieldType::Button => FieldKind::Button,
        };

        Ok(Field::with_kind(wire.id, wire.label, kind))
    }
}

fn typed_input<R: FieldRules>(
    (placeholder, required): (String, bool),
    validation: &ValidationConfig,
) -> Input<R> {
    Input {
        placeholder,
        required,
        rules: R::from_config(validation),
    }
}

fn typed_choice<R: FieldRules>(
    (placeholder, required): (String, bool),
    options: Vec<FieldOption>,
    validation: &ValidationConfig,
) -> Choice<R> {
    Choice {
        placeholder,
        required,
        options,
        rules: R::from_config(validation),
    }
}

impl From<Field> for WireField {
    fn from(field: Field) -> Self {
        let field_type = field.field_type();
        let placeholder = field.placeholder().map(str::to_owned);
        let required = field_type.is_input().then(|| field.required_flag());
        let options = field.options().map(<[FieldOption]>::to_vec);
        let validation = Some(field.validation()).filter(|v| !v.is_empty());
        let id = field.id().clone();

        let (fields, collapsed) = match field.kind {
            FieldKind::Section(section) => (Some(section.fields), Some(section.collapsed)),
            _ => (None, None),
        };

        Self {
            id,
            field_type: Some(field_type),
            label: field.label,
            placeholder,
            required,
            options,
            validation,
            fields,
            collapsed,
        }
    }
}
