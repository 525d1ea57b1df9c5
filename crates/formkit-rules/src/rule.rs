//! Rules and rule sets.
//!
//! # Invariants
//!
//! 1. A [`RuleSet`] holds at most one rule per [`RuleKind`].
//! 2. [`RuleSet::check`] evaluates rules in [`RuleKind`] order and stops at
//!    the first failure, so `maxChecked` is only evaluated once `minChecked`
//!    passed, and length rules only once `required` passed.
//! 3. Rules other than `required` accept an empty value; emptiness is the
//!    `required` rule's concern alone.
//! 4. Structural equality: two rule sets are equal when they hold the same
//!    kinds, parameters, and messages. Patterns compare by source text.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;

use crate::value::FieldValue;

/// Name of a constraint, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleKind {
    Required,
    Numeric,
    MinLength,
    MaxLength,
    Pattern,
    Min,
    Max,
    MinChecked,
    MaxChecked,
}

impl RuleKind {
    /// The constraint name as used by form runtimes (`"minLength"`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Numeric => "numeric",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::Pattern => "pattern",
            Self::Min => "min",
            Self::Max => "max",
            Self::MinChecked => "minChecked",
            Self::MaxChecked => "maxChecked",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled regular expression that compares by its source text.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub(crate) fn new(regex: Regex) -> Self {
        Self(regex)
    }

    /// The source text of the pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Unanchored search, like `RegExp.prototype.test`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.as_str())
    }
}

/// A constraint and its parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Required,
    /// The value must parse as a finite number.
    Numeric,
    MinLength(usize),
    MaxLength(usize),
    Pattern(Pattern),
    Min(f64),
    Max(f64),
    MinChecked(usize),
    MaxChecked(usize),
}

impl Constraint {
    #[must_use]
    pub const fn kind(&self) -> RuleKind {
        match self {
            Self::Required => RuleKind::Required,
            Self::Numeric => RuleKind::Numeric,
            Self::MinLength(_) => RuleKind::MinLength,
            Self::MaxLength(_) => RuleKind::MaxLength,
            Self::Pattern(_) => RuleKind::Pattern,
            Self::Min(_) => RuleKind::Min,
            Self::Max(_) => RuleKind::Max,
            Self::MinChecked(_) => RuleKind::MinChecked,
            Self::MaxChecked(_) => RuleKind::MaxChecked,
        }
    }

    /// Whether `value` satisfies this constraint.
    #[must_use]
    pub fn test(&self, value: &FieldValue) -> bool {
        match self {
            Self::Required => !value.is_empty(),
            Self::MinChecked(n) => value.selected_count() >= *n,
            Self::MaxChecked(n) => value.selected_count() <= *n,
            _ => {
                let Some(text) = value.as_text().filter(|t| !t.is_empty()) else {
                    return true;
                };
                match self {
                    Self::Numeric => parse_number(text).is_some(),
                    Self::MinLength(n) => text.chars().count() >= *n,
                    Self::MaxLength(n) => text.chars().count() <= *n,
                    Self::Pattern(p) => p.is_match(text),
                    Self::Min(min) => parse_number(text).is_none_or(|v| v >= *min),
                    Self::Max(max) => parse_number(text).is_none_or(|v| v <= *max),
                    Self::Required | Self::MinChecked(_) | Self::MaxChecked(_) => true,
                }
            }
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// One executable constraint with its failure message.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    constraint: Constraint,
    message: String,
}

impl Rule {
    #[must_use]
    pub fn new(constraint: Constraint, message: impl Into<String>) -> Self {
        Self {
            constraint,
            message: message.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        self.constraint.kind()
    }

    #[inline]
    #[must_use]
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether `value` satisfies the rule.
    #[must_use]
    pub fn test(&self, value: &FieldValue) -> bool {
        self.constraint.test(value)
    }
}

/// A failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: RuleKind,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The rules derived for one field, keyed by constraint name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: BTreeMap<RuleKind, Rule>,
}

impl RuleSet {
    /// An empty rule set; every value passes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `rule`, replacing any rule of the same kind.
    pub fn insert(&mut self, rule: Rule) -> Option<Rule> {
        self.rules.insert(rule.kind(), rule)
    }

    #[must_use]
    pub fn get(&self, kind: RuleKind) -> Option<&Rule> {
        self.rules.get(&kind)
    }

    #[must_use]
    pub fn contains(&self, kind: RuleKind) -> bool {
        self.rules.contains_key(&kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    /// Constraint names in evaluation order.
    pub fn kinds(&self) -> impl Iterator<Item = RuleKind> + '_ {
        self.rules.keys().copied()
    }

    /// Check `value`, returning the first failed rule.
    pub fn check(&self, value: &FieldValue) -> Result<(), Violation> {
        match self.rules.values().find(|rule| !rule.test(value)) {
            Some(rule) => Err(Violation {
                kind: rule.kind(),
                message: rule.message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::collections::btree_map::Values<'a, RuleKind, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::text(s)
    }

    #[test]
    fn optional_rules_skip_empty_values() {
        for c in [
            Constraint::Numeric,
            Constraint::MinLength(3),
            Constraint::Min(1.0),
            Constraint::Pattern(Pattern::new(Regex::new("^x$").unwrap())),
        ] {
            assert!(c.test(&text("")), "{c:?}");
        }
        assert!(!Constraint::Required.test(&text("")));
    }

    #[test]
    fn lengths_count_characters() {
        assert!(Constraint::MaxLength(2).test(&text("éé")));
        assert!(!Constraint::MinLength(3).test(&text("éé")));
    }

    #[test]
    fn numeric_bounds() {
        assert!(Constraint::Numeric.test(&text(" 4.5 ")));
        assert!(!Constraint::Numeric.test(&text("four")));
        assert!(!Constraint::Numeric.test(&text("NaN")));
        assert!(Constraint::Min(0.0).test(&text("0")));
        assert!(!Constraint::Min(0.0).test(&text("-1")));
        assert!(Constraint::Max(10.0).test(&text("10")));
        // Non-numbers are left to the numeric rule.
        assert!(Constraint::Max(10.0).test(&text("abc")));
    }

    #[test]
    fn check_reports_first_failure_in_order() {
        let mut rules = RuleSet::new();
        rules.insert(Rule::new(Constraint::MaxChecked(1), "at most"));
        rules.insert(Rule::new(Constraint::MinChecked(1), "at least"));

        let err = rules.check(&FieldValue::checked(Vec::<String>::new())).unwrap_err();
        assert_eq!(err.kind, RuleKind::MinChecked);
        assert_eq!(err.message, "at least");

        let err = rules.check(&FieldValue::checked(["a", "b"])).unwrap_err();
        assert_eq!(err.kind, RuleKind::MaxChecked);
        assert!(rules.check(&FieldValue::checked(["a"])).is_ok());
        assert_eq!(
            rules.kinds().collect::<Vec<_>>(),
            [RuleKind::MinChecked, RuleKind::MaxChecked]
        );
    }

    #[test]
    fn patterns_compare_by_source() {
        let a = Pattern::new(Regex::new("a+").unwrap());
        let b = Pattern::new(Regex::new("a+").unwrap());
        assert_eq!(a, b);
        assert_eq!(format!("{a:?}"), "/a+/");
    }
}
