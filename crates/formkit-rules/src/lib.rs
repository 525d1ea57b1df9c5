#![forbid(unsafe_code)]

//! Validation rules for formkit fields.
//!
//! - [`derive_rules`] maps a [`Field`](formkit_schema::Field) to a [`RuleSet`]:
//!   a pure, deterministic function, so its output can be memoized per field
//!   (see [`RuleCache`]).
//! - [`RuleSet::check`] tests a [`FieldValue`] against the rules and reports
//!   the first [`Violation`].
//! - [`validate_submission`] checks a whole form at submit time.
//!
//! # Constraint table
//!
//! | type | constraints |
//! |------|-------------|
//! | text, textarea | required, minLength, maxLength, pattern |
//! | number | required, numeric, min, max |
//! | email | required, pattern (default address pattern) |
//! | select, radio | required |
//! | checkbox | required, minChecked, maxChecked |
//! | OTP | required, minLength = maxLength = length |
//! | section, button | none |

mod cache;
mod derive;
mod error;
mod rule;
mod submit;
mod value;

pub use cache::RuleCache;
pub use derive::{EMAIL_PATTERN, derive_rules};
pub use error::RuleError;
pub use rule::{Constraint, Pattern, Rule, RuleKind, RuleSet, Violation};
pub use submit::{FieldError, SubmissionReport, validate_submission};
pub use value::FieldValue;
