//! Declarative vendor-field mapping
//!
//! A mapping is a static table of [`FieldRule`]s. Each rule names a path into
//! the vendor JSON record, the canonical field it fills, and the transform
//! applied on the way. Rules are evaluated in table order, so when two rules
//! target the same field the later one wins if its source is present.
//!
//! Sources that are missing, `null`, or an empty string are skipped rather
//! than defaulted.

use crate::models::{SegmentField, SegmentFields};
use crate::services::name_cleaners::sanitize;
use asrkit_common::Error;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// One step of a path into a JSON record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep {
    /// Object member
    Key(&'static str),
    /// Array element
    Index(usize),
}

/// Conversion applied to a source value before assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Strings as-is, numbers and booleans stringified
    Text,
    /// Number or numeric string, in seconds
    Seconds,
    /// Number or numeric string, unitless; an unreadable value is skipped
    /// with a warning instead of rejecting the record
    Number,
    /// Text passed through the speaker-name sanitizer
    SanitizedName,
    /// Gender text wrapped as an STM label, `<o,f0,{gender}>`
    GenderLabel,
}

/// Maps one vendor path onto one canonical field
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub source: &'static [PathStep],
    pub target: SegmentField,
    pub transform: Transform,
}

impl FieldRule {
    pub const fn new(
        source: &'static [PathStep],
        target: SegmentField,
        transform: Transform,
    ) -> Self {
        Self {
            source,
            target,
            transform,
        }
    }

    fn source_name(&self) -> String {
        self.source
            .iter()
            .map(|step| match step {
                PathStep::Key(key) => key.to_string(),
                PathStep::Index(i) => i.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Field mapping errors
#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    /// Source value could not be read as a number
    #[error("field '{field}' is not numeric: {value}")]
    NotNumeric { field: String, value: String },

    /// Source value is an object or array where a scalar was expected
    #[error("field '{field}' has unsupported type: {value}")]
    UnsupportedType { field: String, value: String },

    /// Rule pairs a numeric transform with a text field or vice versa
    #[error("rule for '{field}' produces the wrong kind of value for {target:?}")]
    TargetMismatch { field: String, target: SegmentField },
}

impl From<FieldError> for Error {
    fn from(err: FieldError) -> Self {
        Error::Parse(err.to_string())
    }
}

enum FieldValue {
    Text(String),
    Number(f64),
}

/// Follow `path` into `record`; `None` if any step is absent
pub fn resolve<'a>(record: &'a Value, path: &[PathStep]) -> Option<&'a Value> {
    path.iter().try_fold(record, |value, step| match step {
        PathStep::Key(key) => value.get(*key),
        PathStep::Index(i) => value.get(*i),
    })
}

/// Read a JSON number or numeric string as `f64`
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Read a JSON scalar as text; `None` for null, objects and arrays
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Evaluate every rule against `record`, in order
pub fn apply_rules(rules: &[FieldRule], record: &Value) -> Result<SegmentFields, FieldError> {
    let mut fields = SegmentFields::default();

    for rule in rules {
        let Some(raw) = resolve(record, rule.source) else {
            continue;
        };
        if raw.is_null() || raw.as_str() == Some("") {
            continue;
        }

        let value = match convert(rule, raw) {
            Ok(value) => value,
            Err(e) if rule.transform == Transform::Number => {
                warn!(error = %e, "Ignoring unreadable optional field");
                continue;
            }
            Err(e) => return Err(e),
        };
        if matches!(&value, FieldValue::Text(text) if text.is_empty()) {
            continue;
        }
        assign(&mut fields, rule, value)?;
    }

    Ok(fields)
}

fn convert(rule: &FieldRule, raw: &Value) -> Result<FieldValue, FieldError> {
    match rule.transform {
        Transform::Seconds | Transform::Number => value_as_f64(raw)
            .map(FieldValue::Number)
            .ok_or_else(|| FieldError::NotNumeric {
                field: rule.source_name(),
                value: raw.to_string(),
            }),
        Transform::Text | Transform::SanitizedName | Transform::GenderLabel => {
            let text = value_as_text(raw).ok_or_else(|| FieldError::UnsupportedType {
                field: rule.source_name(),
                value: raw.to_string(),
            })?;
            Ok(FieldValue::Text(match rule.transform {
                Transform::SanitizedName => sanitize(&text),
                Transform::GenderLabel => format!("<o,f0,{}>", text),
                _ => text,
            }))
        }
    }
}

fn assign(fields: &mut SegmentFields, rule: &FieldRule, value: FieldValue) -> Result<(), FieldError> {
    match (rule.target, value) {
        (SegmentField::Start, FieldValue::Number(v)) => fields.start = Some(v),
        (SegmentField::Stop, FieldValue::Number(v)) => fields.stop = Some(v),
        (SegmentField::Confidence, FieldValue::Number(v)) => fields.confidence = Some(v),
        (SegmentField::Filename, FieldValue::Text(v)) => fields.filename = Some(v),
        (SegmentField::Channel, FieldValue::Text(v)) => fields.channel = Some(v),
        (SegmentField::Speaker, FieldValue::Text(v)) => fields.speaker = Some(v),
        (SegmentField::Label, FieldValue::Text(v)) => fields.label = Some(v),
        (SegmentField::Text, FieldValue::Text(v)) => fields.text = Some(v),
        (SegmentField::FormattedText, FieldValue::Text(v)) => fields.formatted_text = Some(v),
        (target, _) => {
            return Err(FieldError::TargetMismatch {
                field: rule.source_name(),
                target,
            })
        }
    }
    Ok(())
}
