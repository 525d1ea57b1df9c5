//! Field -> RuleSet derivation.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Invalid pattern | `validation.pattern` does not compile | [`RuleError::InvalidPattern`] |
//!
//! Nothing else fails: parameters are already typed by the schema, and unset
//! parameters simply contribute no rule.

use formkit_schema::{
    CheckboxRules, Choice, ChoiceRules, EmailRules, Field, FieldId, FieldKind, Input, NumberRules,
    OtpRules, TextRules,
};
use regex::Regex;

use crate::error::RuleError;
use crate::rule::{Constraint, Pattern, Rule, RuleSet};

/// Address pattern applied to email fields without their own pattern.
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

const REQUIRED: &str = "This field is required";
const SELECT_AN_OPTION: &str = "Please select an option";

/// Derive the executable rules for `field`.
///
/// Pure and deterministic: structurally equal fields yield equal rule sets.
/// The legacy `required` flag and `validation.required` both produce the
/// `required` rule. Sections and buttons have no rules; their children are
/// derived on their own.
pub fn derive_rules(field: &Field) -> Result<RuleSet, RuleError> {
    let mut rules = RuleSet::new();
    let id = field.id();

    match &field.kind {
        FieldKind::Text(input) | FieldKind::Textarea(input) => text(&mut rules, id, input)?,
        FieldKind::Number(input) => number(&mut rules, input),
        FieldKind::Email(input) => email(&mut rules, id, input)?,
        FieldKind::Otp(input) => otp(&mut rules, input),
        FieldKind::Select(choice) | FieldKind::Radio(choice) => single_choice(&mut rules, choice),
        FieldKind::Checkbox(choice) => checkbox(&mut rules, choice),
        FieldKind::Section(_) | FieldKind::Button => {}
    }

    Ok(rules)
}

fn text(rules: &mut RuleSet, id: &FieldId, input: &Input<TextRules>) -> Result<(), RuleError> {
    let TextRules {
        required,
        min_length,
        max_length,
        pattern,
    } = &input.rules;

    if input.required || required.unwrap_or(false) {
        rules.insert(Rule::new(Constraint::Required, REQUIRED));
    }
    if let Some(n) = *min_length {
        rules.insert(Rule::new(
            Constraint::MinLength(n),
            format!("Minimum length is {n}"),
        ));
    }
    if let Some(n) = *max_length {
        rules.insert(Rule::new(
            Constraint::MaxLength(n),
            format!("Maximum length is {n}"),
        ));
    }
    if let Some(source) = pattern {
        rules.insert(Rule::new(
            Constraint::Pattern(compile(id, source)?),
            "Invalid format",
        ));
    }
    Ok(())
}

fn number(rules: &mut RuleSet, input: &Input<NumberRules>) {
    let NumberRules { required, min, max } = &input.rules;

    if input.required || required.unwrap_or(false) {
        rules.insert(Rule::new(Constraint::Required, REQUIRED));
    }
    rules.insert(Rule::new(Constraint::Numeric, "Please enter a number"));
    if let Some(min) = *min {
        rules.insert(Rule::new(Constraint::Min(min), format!("Minimum value is {min}")));
    }
    if let Some(max) = *max {
        rules.insert(Rule::new(Constraint::Max(max), format!("Maximum value is {max}")));
    }
}

fn email(rules: &mut RuleSet, id: &FieldId, input: &Input<EmailRules>) -> Result<(), RuleError> {
    if input.required || input.rules.required.unwrap_or(false) {
        rules.insert(Rule::new(Constraint::Required, REQUIRED));
    }
    let source = input.rules.pattern.as_deref().unwrap_or(EMAIL_PATTERN);
    rules.insert(Rule::new(
        Constraint::Pattern(compile(id, source)?),
        "Invalid email address",
    ));
    Ok(())
}

fn otp(rules: &mut RuleSet, input: &Input<OtpRules>) {
    if input.required || input.rules.required.unwrap_or(false) {
        rules.insert(Rule::new(Constraint::Required, REQUIRED));
    }
    // A zero length means "no length rule".
    if let Some(n) = input.rules.length.filter(|n| *n > 0) {
        let message = format!("OTP must be {n} digits");
        rules.insert(Rule::new(Constraint::MinLength(n), message.clone()));
        rules.insert(Rule::new(Constraint::MaxLength(n), message));
    }
}

fn single_choice(rules: &mut RuleSet, choice: &Choice<ChoiceRules>) {
    if choice.rules.required.unwrap_or(false) {
        rules.insert(Rule::new(Constraint::Required, SELECT_AN_OPTION));
    } else if choice.required {
        rules.insert(Rule::new(Constraint::Required, REQUIRED));
    }
}

fn checkbox(rules: &mut RuleSet, choice: &Choice<CheckboxRules>) {
    let CheckboxRules {
        required,
        min_checked,
        max_checked,
    } = &choice.rules;

    if choice.required || required.unwrap_or(false) {
        rules.insert(Rule::new(Constraint::Required, REQUIRED));
    }
    if let Some(n) = *min_checked {
        rules.insert(Rule::new(
            Constraint::MinChecked(n),
            format!("Select at least {n}"),
        ));
    }
    if let Some(n) = *max_checked {
        rules.insert(Rule::new(
            Constraint::MaxChecked(n),
            format!("Select at most {n}"),
        ));
    }
}

fn compile(id: &FieldId, source: &str) -> Result<Pattern, RuleError> {
    Regex::new(source)
        .map(Pattern::new)
        .map_err(|source_err| RuleError::InvalidPattern {
            field_id: id.clone(),
            pattern: source.to_owned(),
            source: source_err,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleKind;
    use crate::value::FieldValue;
    use formkit_schema::{FieldPatch, FieldType, ValidationConfig};
    use proptest::prelude::*;

    fn field(ty: FieldType, validation: ValidationConfig) -> Field {
        let mut f = Field::new(FieldId::new("f"), ty);
        f.apply(FieldPatch::new().with_validation(validation));
        f
    }

    fn kinds(rules: &RuleSet) -> Vec<RuleKind> {
        rules.kinds().collect()
    }

    #[test]
    fn text_min_length_only() {
        let rules =
            derive_rules(&field(FieldType::Text, ValidationConfig::new().with_min_length(5)))
                .unwrap();
        assert!(!rules.contains(RuleKind::Required));
        assert!(rules.contains(RuleKind::MinLength));
        assert!(rules.check(&FieldValue::text("abcd")).is_err());
        assert!(rules.check(&FieldValue::text("abcde")).is_ok());
        assert_eq!(
            rules.get(RuleKind::MinLength).unwrap().message(),
            "Minimum length is 5"
        );
    }

    #[test]
    fn legacy_flag_and_validation_both_require() {
        let mut flagged = Field::new(FieldId::new("a"), FieldType::Textarea);
        flagged.apply(FieldPatch::new().with_required(true));
        let by_flag = derive_rules(&flagged).unwrap();
        let by_config =
            derive_rules(&field(FieldType::Textarea, ValidationConfig::new().with_required(true)))
                .unwrap();
        assert_eq!(kinds(&by_flag), [RuleKind::Required]);
        assert_eq!(by_flag, by_config);
    }

    #[test]
    fn pattern_failure_message() {
        let rules =
            derive_rules(&field(FieldType::Text, ValidationConfig::new().with_pattern("^[0-9]+$")))
                .unwrap();
        let err = rules.check(&FieldValue::text("12a")).unwrap_err();
        assert_eq!(err.message, "Invalid format");
        assert!(rules.check(&FieldValue::text("123")).is_ok());
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = derive_rules(&field(FieldType::Text, ValidationConfig::new().with_pattern("(")))
            .unwrap_err();
        let RuleError::InvalidPattern {
            field_id, pattern, ..
        } = err;
        assert_eq!(field_id, "f");
        assert_eq!(pattern, "(");
    }

    #[test]
    fn number_rules() {
        let rules = derive_rules(&field(
            FieldType::Number,
            ValidationConfig::new().with_min(0.0).with_max(10.5),
        ))
        .unwrap();
        assert_eq!(
            kinds(&rules),
            [RuleKind::Numeric, RuleKind::Min, RuleKind::Max]
        );
        assert_eq!(rules.get(RuleKind::Min).unwrap().message(), "Minimum value is 0");
        assert_eq!(
            rules.get(RuleKind::Max).unwrap().message(),
            "Maximum value is 10.5"
        );
        assert_eq!(
            rules.check(&FieldValue::text("x")).unwrap_err().message,
            "Please enter a number"
        );
        assert_eq!(rules.check(&FieldValue::text("-1")).unwrap_err().kind, RuleKind::Min);
        assert!(rules.check(&FieldValue::text("0")).is_ok());
        assert!(rules.check(&FieldValue::text("")).is_ok());
    }

    #[test]
    fn email_uses_default_pattern_unless_overridden() {
        let rules = derive_rules(&Field::new(FieldId::new("e"), FieldType::Email)).unwrap();
        let pattern = rules.get(RuleKind::Pattern).unwrap();
        assert!(matches!(pattern.constraint(), Constraint::Pattern(p) if p.as_str() == EMAIL_PATTERN));
        assert_eq!(
            rules.check(&FieldValue::text("nope")).unwrap_err().message,
            "Invalid email address"
        );
        assert!(rules.check(&FieldValue::text("a@b.co")).is_ok());

        let custom =
            derive_rules(&field(FieldType::Email, ValidationConfig::new().with_pattern("@corp$")))
                .unwrap();
        assert!(custom.check(&FieldValue::text("x@corp")).is_ok());
        assert!(custom.check(&FieldValue::text("x@b.co")).is_err());
    }

    #[test]
    fn select_message_depends_on_source_of_required() {
        let by_config =
            derive_rules(&field(FieldType::Select, ValidationConfig::new().with_required(true)))
                .unwrap();
        assert_eq!(
            by_config.get(RuleKind::Required).unwrap().message(),
            "Please select an option"
        );

        let mut radio = Field::new(FieldId::new("r"), FieldType::Radio);
        radio.apply(FieldPatch::new().with_required(true));
        let by_flag = derive_rules(&radio).unwrap();
        assert_eq!(
            by_flag.get(RuleKind::Required).unwrap().message(),
            "This field is required"
        );
        assert!(by_flag.check(&FieldValue::text("option1")).is_ok());
    }

    #[test]
    fn checkbox_counts_checked_values() {
        let rules = derive_rules(&field(
            FieldType::Checkbox,
            ValidationConfig::new().with_min_checked(1).with_max_checked(2),
        ))
        .unwrap();
        let none = FieldValue::checked(Vec::<String>::new());
        assert_eq!(rules.check(&none).unwrap_err().message, "Select at least 1");
        assert!(rules.check(&FieldValue::checked(["a"])).is_ok());
        assert!(rules.check(&FieldValue::checked(["a", "b"])).is_ok());
        assert_eq!(
            rules.check(&FieldValue::checked(["a", "b", "c"])).unwrap_err().message,
            "Select at most 2"
        );
    }

    #[test]
    fn otp_length_is_exact() {
        let rules =
            derive_rules(&field(FieldType::Otp, ValidationConfig::new().with_length(6))).unwrap();
        assert_eq!(kinds(&rules), [RuleKind::MinLength, RuleKind::MaxLength]);
        for bad in ["12345", "1234567"] {
            assert_eq!(
                rules.check(&FieldValue::text(bad)).unwrap_err().message,
                "OTP must be 6 digits"
            );
        }
        assert!(rules.check(&FieldValue::text("123456")).is_ok());

        let zero =
            derive_rules(&field(FieldType::Otp, ValidationConfig::new().with_length(0))).unwrap();
        assert!(zero.is_empty());
    }

    #[test]
    fn sections_and_buttons_have_no_rules() {
        for ty in [FieldType::Section, FieldType::Button] {
            let f = field(ty, ValidationConfig::new().with_required(true));
            assert!(derive_rules(&f).unwrap().is_empty());
        }
    }

    #[test]
    fn zero_bounds_are_real_rules() {
        let rules = derive_rules(&field(
            FieldType::Text,
            ValidationConfig::new().with_max_length(0),
        ))
        .unwrap();
        assert!(rules.check(&FieldValue::text("a")).is_err());
    }

    fn any_config() -> impl Strategy<Value = ValidationConfig> {
        (
            any::<Option<bool>>(),
            proptest::option::of(0usize..20),
            proptest::option::of(0usize..20),
            proptest::option::of("[a-z]{0,3}"),
            proptest::option::of(-100.0f64..100.0),
            proptest::option::of(0usize..5),
            proptest::option::of(0usize..8),
        )
            .prop_map(|(required, min_len, max_len, pattern, min, checked, length)| {
                ValidationConfig {
                    required,
                    min_length: min_len,
                    max_length: max_len,
                    pattern: pattern.filter(|p| !p.is_empty()),
                    min,
                    max: min.map(|m| m + 10.0),
                    min_checked: checked,
                    max_checked: checked.map(|c| c + 1),
                    length,
                }
            })
    }

    proptest! {
        #[test]
        fn derivation_is_deterministic(
            ty in proptest::sample::select(FieldType::ALL.to_vec()),
            config in any_config(),
        ) {
            let f = field(ty, config);
            let a = derive_rules(&f).unwrap();
            let b = derive_rules(&f.clone()).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
