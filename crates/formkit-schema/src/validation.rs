//! Validation parameters.
//!
//! Two representations live here:
//!
//! - [`ValidationConfig`] is the flat `validation` object of the wire format.
//!   Every parameter is optional, and a configuration panel edits it as a
//!   whole.
//! - The per-type rule records ([`TextRules`], [`NumberRules`], [`EmailRules`],
//!   [`ChoiceRules`], [`CheckboxRules`], [`OtpRules`]) keep only the
//!   parameters that apply to one field type.
//!
//! # Unset parameters
//!
//! A parameter given as `""`, `null`, or left out is unset. `0` is a real
//! value and is kept. Numeric parameters may arrive as JSON numbers or as
//! numeric strings (`"5"`), since form editors write raw input text.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Non-numeric string | `"minLength": "abc"` | Deserialization error |
//! | Negative or fractional count | `"maxChecked": -1` | Deserialization error |
//! | Non-finite bound | `"min": "inf"` | Deserialization error |

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Flat validation configuration as found in the `validation` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(
        default,
        deserialize_with = "param::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_length: Option<usize>,
    #[serde(
        default,
        deserialize_with = "param::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_length: Option<usize>,
    #[serde(
        default,
        deserialize_with = "param::pattern",
        skip_serializing_if = "Option::is_none"
    )]
    pub pattern: Option<String>,
    #[serde(
        default,
        deserialize_with = "param::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub min: Option<f64>,
    #[serde(
        default,
        deserialize_with = "param::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max: Option<f64>,
    #[serde(
        default,
        deserialize_with = "param::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_checked: Option<usize>,
    #[serde(
        default,
        deserialize_with = "param::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_checked: Option<usize>,
    #[serde(
        default,
        deserialize_with = "param::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub length: Option<usize>,
}

impl ValidationConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    #[must_use]
    pub fn with_min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    #[must_use]
    pub fn with_max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    /// Set the pattern; an empty string clears it.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        self.pattern = (!pattern.is_empty()).then_some(pattern);
        self
    }

    #[must_use]
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn with_min_checked(mut self, n: usize) -> Self {
        self.min_checked = Some(n);
        self
    }

    #[must_use]
    pub fn with_max_checked(mut self, n: usize) -> Self {
        self.max_checked = Some(n);
        self
    }

    #[must_use]
    pub fn with_length(mut self, n: usize) -> Self {
        self.length = Some(n);
        self
    }
}

// ---------------------------------------------------------------------------
// Per-type rule records
// ---------------------------------------------------------------------------

/// Conversion between a per-type rule record and the flat configuration.
///
/// `from_config` keeps only the parameters that apply to the type;
/// `to_config(from_config(c))` is therefore a projection of `c`, not
/// necessarily `c` itself.
pub trait FieldRules: Clone + Default + PartialEq {
    /// Project the applicable parameters out of `config`.
    fn from_config(config: &ValidationConfig) -> Self;

    /// Write the parameters back in wire form.
    fn to_config(&self) -> ValidationConfig;
}

/// Rules for `text` and `textarea` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRules {
    /// `validation.required` as written; unset and `false` both mean optional.
    pub required: Option<bool>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
}

impl FieldRules for TextRules {
    fn from_config(config: &ValidationConfig) -> Self {
        Self {
            required: config.required,
            min_length: config.min_length,
            max_length: config.max_length,
            pattern: config.pattern.clone(),
        }
    }

    fn to_config(&self) -> ValidationConfig {
        ValidationConfig {
            required: self.required,
            min_length: self.min_length,
            max_length: self.max_length,
            pattern: self.pattern.clone(),
            ..ValidationConfig::default()
        }
    }
}

/// Rules for `number` fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberRules {
    /// `validation.required` as written; unset and `false` both mean optional.
    pub required: Option<bool>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FieldRules for NumberRules {
    fn from_config(config: &ValidationConfig) -> Self {
        Self {
            required: config.required,
            min: config.min,
            max: config.max,
        }
    }

    fn to_config(&self) -> ValidationConfig {
        ValidationConfig {
            required: self.required,
            min: self.min,
            max: self.max,
            ..ValidationConfig::default()
        }
    }
}

/// Rules for `email` fields. A missing pattern means the default address
/// pattern applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailRules {
    /// `validation.required` as written; unset and `false` both mean optional.
    pub required: Option<bool>,
    pub pattern: Option<String>,
}

impl FieldRules for EmailRules {
    fn from_config(config: &ValidationConfig) -> Self {
        Self {
            required: config.required,
            pattern: config.pattern.clone(),
        }
    }

    fn to_config(&self) -> ValidationConfig {
        ValidationConfig {
            required: self.required,
            pattern: self.pattern.clone(),
            ..ValidationConfig::default()
        }
    }
}

/// Rules for `select` and `radio` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceRules {
    /// `validation.required` as written; unset and `false` both mean optional.
    pub required: Option<bool>,
}

impl FieldRules for ChoiceRules {
    fn from_config(config: &ValidationConfig) -> Self {
        Self {
            required: config.required,
        }
    }

    fn to_config(&self) -> ValidationConfig {
        ValidationConfig {
            required: self.required,
            ..ValidationConfig::default()
        }
    }
}

/// Rules for `checkbox` fields, counted over the checked values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckboxRules {
    /// `validation.required` as written; unset and `false` both mean optional.
    pub required: Option<bool>,
    pub min_checked: Option<usize>,
    pub max_checked: Option<usize>,
}

impl FieldRules for CheckboxRules {
    fn from_config(config: &ValidationConfig) -> Self {
        Self {
            required: config.required,
            min_checked: config.min_checked,
            max_checked: config.max_checked,
        }
    }

    fn to_config(&self) -> ValidationConfig {
        ValidationConfig {
            required: self.required,
            min_checked: self.min_checked,
            max_checked: self.max_checked,
            ..ValidationConfig::default()
        }
    }
}

/// Rules for `OTP` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpRules {
    /// `validation.required` as written; unset and `false` both mean optional.
    pub required: Option<bool>,
    /// Exact number of characters; `0` disables the length rule.
    pub length: Option<usize>,
}

impl FieldRules for OtpRules {
    fn from_config(config: &ValidationConfig) -> Self {
        Self {
            required: config.required,
            length: config.length,
        }
    }

    fn to_config(&self) -> ValidationConfig {
        ValidationConfig {
            required: self.required,
            length: self.length,
            ..ValidationConfig::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient parameter decoding
// ---------------------------------------------------------------------------

mod param {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    fn raw_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Option::<Raw>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(Raw::Number(n)) => n,
            Some(Raw::Text(s)) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                s.parse::<f64>()
                    .map_err(|_| de::Error::custom(format!("`{s}` is not a number")))?
            }
        };
        if value.is_finite() {
            Ok(Some(value))
        } else {
            Err(de::Error::custom("parameter must be a finite number"))
        }
    }

    pub(super) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        raw_number(deserializer)
    }

    pub(super) fn count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match raw_number(deserializer)? {
            None => Ok(None),
            Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= usize::MAX as f64 => {
                Ok(Some(n as usize))
            }
            Some(n) => Err(de::Error::custom(format!(
                "`{n}` is not a non-negative whole number"
            ))),
        }
    }

    pub(super) fn pattern<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.filter(|p| !p.is_empty()))
    }
}
