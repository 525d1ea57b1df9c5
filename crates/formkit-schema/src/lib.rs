#![forbid(unsafe_code)]

//! Field model and document format for formkit.
//!
//! This crate provides:
//! - [`Field`] and [`FieldKind`]: one form element, as a tagged union keyed by
//!   [`FieldType`] where each variant carries only the attributes that apply
//!   to it.
//! - [`ValidationConfig`]: the flat, wire-level validation parameters, and the
//!   per-type rule records derived from it ([`TextRules`], [`NumberRules`], ...).
//! - [`FieldPatch`]: a staged edit committed in one shallow merge.
//! - [`FormDocument`]: the export/import unit (`title`, `description`, `fields`),
//!   including the legacy bare-array format.

pub mod document;
pub mod error;
pub mod field;
pub mod id;
pub mod patch;
pub mod validation;
mod wire;

pub use document::FormDocument;
pub use error::SchemaError;
pub use field::{Choice, Field, FieldKind, FieldOption, FieldType, Input, Section};
pub use id::FieldId;
pub use patch::FieldPatch;
pub use validation::{
    CheckboxRules, ChoiceRules, EmailRules, FieldRules, NumberRules, OtpRules, TextRules,
    ValidationConfig,
};
