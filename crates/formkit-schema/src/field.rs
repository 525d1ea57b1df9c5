//! The field model.
//!
//! A [`Field`] is an id, a label, and a [`FieldKind`]. The kind is a tagged
//! union keyed by [`FieldType`]; every variant declares only the attributes
//! that apply to it, so a `text` field cannot carry options and a `button`
//! cannot carry validation.
//!
//! # Invariants
//!
//! 1. A field's type never changes after construction; [`Field::apply`] edits
//!    attributes inside the existing variant.
//! 2. Ids are unique across the whole tree, section children included. The
//!    model does not enforce this on its own; [`FormDocument`] checks it on
//!    import and the store only ever inserts generated ids.
//!
//! [`FormDocument`]: crate::FormDocument

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::id::FieldId;
use crate::patch::FieldPatch;
use crate::validation::{
    CheckboxRules, ChoiceRules, EmailRules, FieldRules, NumberRules, OtpRules, TextRules,
    ValidationConfig,
};
use crate::wire::WireField;

// ---------------------------------------------------------------------------
// FieldType
// ---------------------------------------------------------------------------

/// The closed set of field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Number,
    Email,
    #[serde(rename = "OTP")]
    Otp,
    Section,
    Button,
}

impl FieldType {
    /// Every field type, in palette order.
    pub const ALL: [FieldType; 10] = [
        Self::Text,
        Self::Textarea,
        Self::Select,
        Self::Checkbox,
        Self::Radio,
        Self::Number,
        Self::Email,
        Self::Otp,
        Self::Section,
        Self::Button,
    ];

    /// Wire name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Number => "number",
            Self::Email => "email",
            Self::Otp => "OTP",
            Self::Section => "section",
            Self::Button => "button",
        }
    }

    /// Wire name with its first letter upper-cased (`"Text"`, `"OTP"`).
    #[must_use]
    pub fn display_name(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Whether fields of this type carry an option list.
    #[must_use]
    pub const fn has_options(self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::Checkbox)
    }

    /// Whether fields of this type hold a user-entered value.
    #[must_use]
    pub const fn is_input(self) -> bool {
        !matches!(self, Self::Section | Self::Button)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownFieldType(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// One `{label, value}` choice of a select, radio, or checkbox field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// The `n`-th generated option (`"Option n"` / `"optionn"`), 1-based.
    #[must_use]
    pub fn numbered(n: usize) -> Self {
        Self::new(format!("Option {n}"), format!("option{n}"))
    }
}

// ---------------------------------------------------------------------------
// Variant payloads
// ---------------------------------------------------------------------------

/// Payload of free-entry inputs (text, textarea, number, email, OTP).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Input<R> {
    pub placeholder: String,
    /// Legacy `required` flag; composes with `rules.required`.
    pub required: bool,
    pub rules: R,
}

/// Payload of option-based inputs (select, radio, checkbox).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Choice<R> {
    pub placeholder: String,
    pub required: bool,
    pub options: Vec<FieldOption>,
    pub rules: R,
}

/// Payload of a `section`: a collapsible group of nested fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub fields: Vec<Field>,
    /// Display-only flag.
    pub collapsed: bool,
}

/// Type-specific attributes of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text(Input<TextRules>),
    Textarea(Input<TextRules>),
    Number(Input<NumberRules>),
    Email(Input<EmailRules>),
    Otp(Input<OtpRules>),
    Select(Choice<ChoiceRules>),
    Radio(Choice<ChoiceRules>),
    Checkbox(Choice<CheckboxRules>),
    Section(Section),
    Button,
}

impl FieldKind {
    /// Default attributes for a freshly added field of type `ty`.
    ///
    /// Placeholders read `"<Type> Placeholder"`; select and radio start with
    /// two numbered options; checkboxes start empty and fall back to a single
    /// synthetic option (see [`Field::effective_options`]).
    #[must_use]
    pub fn default_for(ty: FieldType) -> Self {
        let placeholder = format!("{} Placeholder", ty.display_name());
        let two_options = || vec![FieldOption::numbered(1), FieldOption::numbered(2)];

        match ty {
            FieldType::Text => Self::Text(input(placeholder)),
            FieldType::Textarea => Self::Textarea(input(placeholder)),
            FieldType::Number => Self::Number(input(placeholder)),
            FieldType::Email => Self::Email(input(placeholder)),
            FieldType::Otp => Self::Otp(input(placeholder)),
            FieldType::Select => Self::Select(choice(placeholder, two_options())),
            FieldType::Radio => Self::Radio(choice(placeholder, two_options())),
            FieldType::Checkbox => Self::Checkbox(choice(placeholder, Vec::new())),
            FieldType::Section => Self::Section(Section::default()),
            FieldType::Button => Self::Button,
        }
    }

    /// The type tag of this variant.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        match self {
            Self::Text(_) => FieldType::Text,
            Self::Textarea(_) => FieldType::Textarea,
            Self::Number(_) => FieldType::Number,
            Self::Email(_) => FieldType::Email,
            Self::Otp(_) => FieldType::Otp,
            Self::Select(_) => FieldType::Select,
            Self::Radio(_) => FieldType::Radio,
            Self::Checkbox(_) => FieldType::Checkbox,
            Self::Section(_) => FieldType::Section,
            Self::Button => FieldType::Button,
        }
    }
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// One form element.
///
/// Serializes to and from the flat JSON record
/// `{id, type, label, placeholder?, required?, options?, validation?, fields?, collapsed?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireField", into = "WireField")]
pub struct Field {
    id: FieldId,
    pub label: String,
    pub kind: FieldKind,
}

impl Field {
    /// A field of type `ty` with default label, placeholder, and options.
    #[must_use]
    pub fn new(id: FieldId, ty: FieldType) -> Self {
        Self {
            id,
            label: format!("{} Field", ty.display_name()),
            kind: FieldKind::default_for(ty),
        }
    }

    /// A field with explicit attributes.
    #[must_use]
    pub fn with_kind(id: FieldId, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id,
            label: label.into(),
            kind,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &FieldId {
        &self.id
    }

    #[inline]
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    /// Placeholder text, for types that show one.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Text(i) | FieldKind::Textarea(i) => Some(&i.placeholder),
            FieldKind::Number(i) => Some(&i.placeholder),
            FieldKind::Email(i) => Some(&i.placeholder),
            FieldKind::Otp(i) => Some(&i.placeholder),
            FieldKind::Select(c) | FieldKind::Radio(c) => Some(&c.placeholder),
            FieldKind::Checkbox(c) => Some(&c.placeholder),
            FieldKind::Section(_) | FieldKind::Button => None,
        }
    }

    /// The legacy `required` flag (not the `validation.required` parameter).
    #[must_use]
    pub fn required_flag(&self) -> bool {
        match &self.kind {
            FieldKind::Text(i) | FieldKind::Textarea(i) => i.required,
            FieldKind::Number(i) => i.required,
            FieldKind::Email(i) => i.required,
            FieldKind::Otp(i) => i.required,
            FieldKind::Select(c) | FieldKind::Radio(c) => c.required,
            FieldKind::Checkbox(c) => c.required,
            FieldKind::Section(_) | FieldKind::Button => false,
        }
    }

    /// The configured options, for option-based types.
    #[must_use]
    pub fn options(&self) -> Option<&[FieldOption]> {
        match &self.kind {
            FieldKind::Select(c) | FieldKind::Radio(c) => Some(&c.options),
            FieldKind::Checkbox(c) => Some(&c.options),
            _ => None,
        }
    }

    /// Options as rendered: a checkbox without options shows one synthetic
    /// `Option 1` choice.
    #[must_use]
    pub fn effective_options(&self) -> Cow<'_, [FieldOption]> {
        match &self.kind {
            FieldKind::Checkbox(c) if c.options.is_empty() => {
                Cow::Owned(vec![FieldOption::numbered(1)])
            }
            _ => Cow::Borrowed(self.options().unwrap_or(&[])),
        }
    }

    /// The validation parameters in wire form. Empty for sections and buttons.
    #[must_use]
    pub fn validation(&self) -> ValidationConfig {
        match &self.kind {
            FieldKind::Text(i) | FieldKind::Textarea(i) => i.rules.to_config(),
            FieldKind::Number(i) => i.rules.to_config(),
            FieldKind::Email(i) => i.rules.to_config(),
            FieldKind::Otp(i) => i.rules.to_config(),
            FieldKind::Select(c) | FieldKind::Radio(c) => c.rules.to_config(),
            FieldKind::Checkbox(c) => c.rules.to_config(),
            FieldKind::Section(_) | FieldKind::Button => ValidationConfig::default(),
        }
    }

    /// Nested fields of a section; empty for every other type.
    #[must_use]
    pub fn children(&self) -> &[Field] {
        match &self.kind {
            FieldKind::Section(s) => &s.fields,
            _ => &[],
        }
    }

    /// Mutable access to the nested fields of a section.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Field>> {
        match &mut self.kind {
            FieldKind::Section(s) => Some(&mut s.fields),
            _ => None,
        }
    }

    /// Visit this field and every nested field, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Field)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Shallow-merge `patch` into this field.
    ///
    /// Attributes the field's type does not have are skipped; their names are
    /// returned so callers can report them. The type itself is never changed.
    pub fn apply(&mut self, patch: FieldPatch) -> Vec<&'static str> {
        let FieldPatch {
            label,
            placeholder,
            required,
            options,
            validation,
            collapsed,
            fields,
        } = patch;
        let mut ignored = Vec::new();

        if let Some(label) = label {
            self.label = label;
        }

        match &mut self.kind {
            FieldKind::Text(i) | FieldKind::Textarea(i) => {
                merge_input(i, placeholder, required, validation.as_ref());
                skip(&mut ignored, [("options", options.is_some())]);
            }
            FieldKind::Number(i) => {
                merge_input(i, placeholder, required, validation.as_ref());
                skip(&mut ignored, [("options", options.is_some())]);
            }
            FieldKind::Email(i) => {
                merge_input(i, placeholder, required, validation.as_ref());
                skip(&mut ignored, [("options", options.is_some())]);
            }
            FieldKind::Otp(i) => {
                merge_input(i, placeholder, required, validation.as_ref());
                skip(&mut ignored, [("options", options.is_some())]);
            }
            FieldKind::Select(c) | FieldKind::Radio(c) => {
                merge_choice(c, placeholder, required, options, validation.as_ref());
            }
            FieldKind::Checkbox(c) => {
                merge_choice(c, placeholder, required, options, validation.as_ref());
            }
            FieldKind::Section(section) => {
                if let Some(collapsed) = collapsed {
                    section.collapsed = collapsed;
                }
                if let Some(fields) = fields {
                    section.fields = fields;
                }
                skip(
                    &mut ignored,
                    [
                        ("placeholder", placeholder.is_some()),
                        ("required", required.is_some()),
                        ("options", options.is_some()),
                        ("validation", validation.is_some()),
                    ],
                );
                return ignored;
            }
            FieldKind::Button => {
                skip(
                    &mut ignored,
                    [
                        ("placeholder", placeholder.is_some()),
                        ("required", required.is_some()),
                        ("options", options.is_some()),
                        ("validation", validation.is_some()),
                    ],
                );
            }
        }

        skip(
            &mut ignored,
            [("collapsed", collapsed.is_some()), ("fields", fields.is_some())],
        );
        ignored
    }
}

fn input<R: Default>(placeholder: String) -> Input<R> {
    Input {
        placeholder,
        required: false,
        rules: R::default(),
    }
}

fn choice<R: Default>(placeholder: String, options: Vec<FieldOption>) -> Choice<R> {
    Choice {
        placeholder,
        required: false,
        options,
        rules: R::default(),
    }
}

fn merge_input<R: FieldRules>(
    input: &mut Input<R>,
    placeholder: Option<String>,
    required: Option<bool>,
    validation: Option<&ValidationConfig>,
) {
    if let Some(placeholder) = placeholder {
        input.placeholder = placeholder;
    }
    if let Some(required) = required {
        input.required = required;
    }
    if let Some(config) = validation {
        input.rules = R::from_config(config);
    }
}

fn merge_choice<R: FieldRules>(
    choice: &mut Choice<R>,
    placeholder: Option<String>,
    required: Option<bool>,
    options: Option<Vec<FieldOption>>,
    validation: Option<&ValidationConfig>,
) {
    if let Some(placeholder) = placeholder {
        choice.placeholder = placeholder;
    }
    if let Some(required) = required {
        choice.required = required;
    }
    if let Some(options) = options {
        choice.options = options;
    }
    if let Some(config) = validation {
        choice.rules = R::from_config(config);
    }
}

fn skip<const N: usize>(ignored: &mut Vec<&'static str>, attrs: [(&'static str, bool); N]) {
    ignored.extend(attrs.into_iter().filter(|(_, given)| *given).map(|(name, _)| name));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(ty: FieldType) -> Field {
        Field::new(FieldId::new(format!("{ty}-1")), ty)
    }

    #[test]
    fn defaults_follow_type_name() {
        let f = field(FieldType::Text);
        assert_eq!(f.label, "Text Field");
        assert_eq!(f.placeholder(), Some("Text Placeholder"));
        assert!(!f.required_flag());
        assert_eq!(f.options(), None);

        let otp = field(FieldType::Otp);
        assert_eq!(otp.label, "OTP Field");
    }

    #[test]
    fn select_and_radio_start_with_two_options() {
        for ty in [FieldType::Select, FieldType::Radio] {
            let f = field(ty);
            let options = f.options().unwrap();
            assert_eq!(
                options,
                [
                    FieldOption::new("Option 1", "option1"),
                    FieldOption::new("Option 2", "option2")
                ]
            );
        }
    }

    #[test]
    fn checkbox_synthesizes_one_option_when_empty() {
        let f = field(FieldType::Checkbox);
        assert_eq!(f.options(), Some(&[][..]));
        assert_eq!(
            f.effective_options().as_ref(),
            [FieldOption::new("Option 1", "option1")]
        );
    }

    #[test]
    fn type_names_round_trip() {
        for ty in FieldType::ALL {
            assert_eq!(ty.as_str().parse::<FieldType>().unwrap(), ty);
            assert_eq!(FieldKind::default_for(ty).field_type(), ty);
        }
        assert!(matches!(
            "otp".parse::<FieldType>(),
            Err(SchemaError::UnknownFieldType(_))
        ));
    }

    #[test]
    fn apply_merges_applicable_attributes() {
        let mut f = field(FieldType::Text);
        let ignored = f.apply(
            FieldPatch::new()
                .with_label("Name")
                .with_required(true)
                .with_validation(ValidationConfig::new().with_min_length(2)),
        );
        assert!(ignored.is_empty());
        assert_eq!(f.label, "Name");
        assert!(f.required_flag());
        assert_eq!(f.validation().min_length, Some(2));
        assert_eq!(f.field_type(), FieldType::Text);
    }

    #[test]
    fn apply_reports_inapplicable_attributes() {
        let mut f = field(FieldType::Text);
        let ignored = f.apply(FieldPatch::new().with_options(vec![FieldOption::numbered(1)]));
        assert_eq!(ignored, ["options"]);
        assert_eq!(f.options(), None);

        let mut button = field(FieldType::Button);
        let ignored = button.apply(FieldPatch::new().with_label("Send").with_required(true));
        assert_eq!(ignored, ["required"]);
        assert_eq!(button.label, "Send");
    }

    #[test]
    fn apply_replaces_options_wholesale() {
        let mut f = field(FieldType::Select);
        f.apply(FieldPatch::new().with_options(vec![FieldOption::new("Yes", "y")]));
        assert_eq!(f.options().unwrap(), [FieldOption::new("Yes", "y")]);
    }

    #[test]
    fn walk_visits_section_children() {
        let mut section = field(FieldType::Section);
        section
            .children_mut()
            .unwrap()
            .extend([field(FieldType::Text), field(FieldType::Email)]);
        let mut seen = Vec::new();
        section.walk(&mut |f| seen.push(f.id().to_string()));
        assert_eq!(seen, ["section-1", "text-1", "email-1"]);
    }
}
