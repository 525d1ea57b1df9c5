//! Command implementations.
//!
//! Every command writes its report to `out` and returns an [`Outcome`]; the
//! binary maps that to the exit code.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use formkit::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::cli::{Cli, Command, OutputFormat};
use crate::error::CliError;

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Validation ran and found errors.
    Invalid,
}

impl Outcome {
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Invalid => 1,
        }
    }
}

/// Run the parsed command line. `out` is flushed before returning, so a
/// failed write surfaces as [`CliError::Output`].
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<Outcome, CliError> {
    let outcome = dispatch(cli, out)?;
    out.flush()?;
    Ok(outcome)
}

fn dispatch(cli: &Cli, out: &mut dyn Write) -> Result<Outcome, CliError> {
    match &cli.command {
        Command::Inspect { document } => inspect(document, cli.format, out),
        Command::Check { document } => check(document, cli.format, out),
        Command::Validate { document, values } => validate(document, values, cli.format, out),
        Command::New {
            title,
            description,
            fields,
            output,
        } => new_document(title, description, fields, output.as_deref(), cli.format, out),
    }
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    title: &'a str,
    description: &'a str,
    fields: Vec<FieldSummary>,
}

#[derive(Debug, Serialize)]
struct FieldSummary {
    id: String,
    #[serde(rename = "type")]
    field_type: &'static str,
    label: String,
    depth: usize,
    rules: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn inspect(path: &Path, format: OutputFormat, out: &mut dyn Write) -> Result<Outcome, CliError> {
    let document = load_document(path)?;
    let mut fields = Vec::new();
    for field in &document.fields {
        summarize(field, 0, &mut fields);
    }
    let report = InspectReport {
        title: &document.title,
        description: &document.description,
        fields,
    };

    match format {
        OutputFormat::Json => write_json(out, &report)?,
        OutputFormat::Text => {
            if !report.title.is_empty() {
                writeln!(out, "{}", report.title)?;
            }
            if !report.description.is_empty() {
                writeln!(out, "{}", report.description)?;
            }
            for f in &report.fields {
                let indent = "  ".repeat(f.depth);
                let detail = match &f.error {
                    Some(err) => format!("error: {err}"),
                    None => f.rules.join(", "),
                };
                writeln!(
                    out,
                    "{indent}{:<9} {:<24} {:<20} {detail}",
                    f.field_type,
                    f.id,
                    format!("\"{}\"", f.label),
                )?;
            }
        }
    }
    Ok(Outcome::Success)
}

fn summarize(field: &Field, depth: usize, into: &mut Vec<FieldSummary>) {
    let (rules, error) = match derive_rules(field) {
        Ok(rules) => (rules.kinds().map(RuleKind::as_str).collect(), None),
        Err(err) => (Vec::new(), Some(err.to_string())),
    };
    into.push(FieldSummary {
        id: field.id().to_string(),
        field_type: field.field_type().as_str(),
        label: field.label.clone(),
        depth,
        rules,
        error,
    });
    for child in field.children() {
        summarize(child, depth + 1, into);
    }
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CheckReport {
    ok: bool,
    fields: usize,
}

fn check(path: &Path, format: OutputFormat, out: &mut dyn Write) -> Result<Outcome, CliError> {
    let document = load_document(path)?;
    let all = document.all_fields();
    for field in &all {
        derive_rules(field)?;
    }
    tracing::info!(fields = all.len(), "document checked");

    match format {
        OutputFormat::Json => write_json(
            out,
            &CheckReport {
                ok: true,
                fields: all.len(),
            },
        )?,
        OutputFormat::Text => writeln!(out, "ok: {} fields", all.len())?,
    }
    Ok(Outcome::Success)
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ValidateReport<'a> {
    valid: bool,
    errors: Vec<ErrorEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ErrorEntry<'a> {
    id: &'a str,
    rule: &'static str,
    message: &'a str,
}

fn validate(
    document_path: &Path,
    values_path: &Path,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<Outcome, CliError> {
    let document = load_document(document_path)?;
    let values = parse_values(&read_source(values_path)?)?;
    let report = validate_submission(&document.fields, &values)?;

    let entries: Vec<_> = report
        .errors()
        .iter()
        .map(|e| ErrorEntry {
            id: e.field_id.as_str(),
            rule: e.kind.as_str(),
            message: &e.message,
        })
        .collect();

    match format {
        OutputFormat::Json => write_json(
            out,
            &ValidateReport {
                valid: report.is_valid(),
                errors: entries,
            },
        )?,
        OutputFormat::Text if report.is_valid() => writeln!(out, "valid")?,
        OutputFormat::Text => {
            for e in &entries {
                writeln!(out, "{}: {} ({})", e.id, e.message, e.rule)?;
            }
        }
    }

    Ok(if report.is_valid() {
        Outcome::Success
    } else {
        Outcome::Invalid
    })
}

/// Read a `{"id": value}` object. Strings, numbers and booleans are text
/// values (`false` is empty); arrays of strings are checked sets.
fn parse_values(text: &str) -> Result<HashMap<FieldId, FieldValue>, CliError> {
    let value: Value = serde_json::from_str(text).map_err(|e| CliError::Values(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(CliError::Values("expected a JSON object".into()));
    };

    map.into_iter()
        .map(|(id, raw)| {
            let value = match raw {
                Value::String(s) => FieldValue::text(s),
                Value::Number(n) => FieldValue::text(n.to_string()),
                Value::Bool(true) => FieldValue::text("true"),
                Value::Bool(false) | Value::Null => FieldValue::default(),
                Value::Array(items) => FieldValue::checked(
                    items
                        .into_iter()
                        .map(|item| match item {
                            Value::String(s) => Ok(s),
                            other => Err(CliError::Values(format!(
                                "`{id}`: checked values must be strings, got {other}"
                            ))),
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                Value::Object(_) => {
                    return Err(CliError::Values(format!("`{id}`: unsupported value")));
                }
            };
            Ok((FieldId::new(id), value))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// new
// ---------------------------------------------------------------------------

fn new_document(
    title: &str,
    description: &str,
    specs: &[String],
    output: Option<&Path>,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<Outcome, CliError> {
    let session = FormSession::new(
        SessionConfig::new()
            .with_title(title)
            .with_description(description),
    );
    for spec in specs {
        let (ty, label) = parse_field_spec(spec)?;
        let config = label.map(|label| FieldPatch::new().with_label(label));
        session.store().add_field(ty, config);
    }
    let json = session.export_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n")).map_err(|source| CliError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            match format {
                OutputFormat::Json => write_json(
                    out,
                    &serde_json::json!({ "written": path, "fields": specs.len() }),
                )?,
                OutputFormat::Text => {
                    writeln!(out, "wrote {} fields to {}", specs.len(), path.display())?;
                }
            }
        }
        None => writeln!(out, "{json}")?,
    }
    Ok(Outcome::Success)
}

fn parse_field_spec(spec: &str) -> Result<(FieldType, Option<&str>), CliError> {
    let (ty, label) = match spec.split_once(':') {
        Some((ty, label)) => (ty, Some(label)),
        None => (spec, None),
    };
    // Documents spell types exactly; the command line accepts any case.
    let ty = FieldType::ALL
        .into_iter()
        .find(|t| t.as_str().eq_ignore_ascii_case(ty))
        .ok_or_else(|| CliError::FieldSpec {
            spec: spec.to_owned(),
            reason: format!("unknown field type `{ty}`"),
        })?;
    Ok((ty, label))
}

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn read_source(path: &Path) -> Result<String, CliError> {
    let read_err = |source| CliError::Read {
        path: path.to_path_buf(),
        source,
    };
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(read_err)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).map_err(read_err)
    }
}

fn load_document(path: &Path) -> Result<FormDocument, CliError> {
    let text = read_source(path)?;
    let document = FormDocument::from_json(&text).map_err(|source| CliError::Document {
        path: PathBuf::from(path),
        source,
    })?;
    tracing::debug!(path = %path.display(), fields = document.fields.len(), "document loaded");
    Ok(document)
}

fn write_json(out: &mut dyn Write, value: &impl Serialize) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CliError::Output(e.into()))?;
    writeln!(out, "{text}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_specs() {
        assert_eq!(
            parse_field_spec("email:Work email").unwrap(),
            (FieldType::Email, Some("Work email"))
        );
        assert_eq!(parse_field_spec("otp").unwrap(), (FieldType::Otp, None));
        assert_eq!(parse_field_spec("OTP").unwrap(), (FieldType::Otp, None));
        assert_eq!(
            parse_field_spec("TextArea:Bio").unwrap(),
            (FieldType::Textarea, Some("Bio"))
        );
        assert!(matches!(
            parse_field_spec("slider"),
            Err(CliError::FieldSpec { .. })
        ));
    }

    #[test]
    fn values_file_shapes() {
        let values =
            parse_values(r#"{"a": "x", "b": ["p", "q"], "c": 3, "d": false, "e": null}"#).unwrap();
        assert_eq!(values[&FieldId::new("a")], FieldValue::text("x"));
        assert_eq!(values[&FieldId::new("b")], FieldValue::checked(["p", "q"]));
        assert_eq!(values[&FieldId::new("c")], FieldValue::text("3"));
        assert!(values[&FieldId::new("d")].is_empty());
        assert!(values[&FieldId::new("e")].is_empty());

        assert!(parse_values("[]").is_err());
        assert!(parse_values(r#"{"a": [1]}"#).is_err());
        assert!(parse_values(r#"{"a": {}}"#).is_err());
    }
}
