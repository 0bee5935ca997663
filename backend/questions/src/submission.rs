//! # Submission
//!
//! The server never trusts the raw JSON object. [`SurveySubmission::from_json`]
//! checks every key against the catalog, normalizes the value for its
//! [`FieldKind`], and only then builds the typed record.
//!
//! Normalization rules:
//! - `null` and empty strings are treated as absent
//! - free text is trimmed and capped at [`MAX_TEXT_CHARS`]
//! - choices must be one of the catalog options
//! - ratings and slider values must be integers in `1..=5`, numeric strings are coerced
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    answers::AnswerRecord,
    catalog::{self, FieldKind, RATING_MAX, RATING_MIN, TIMESTAMP_FIELD},
};

pub const MAX_TEXT_CHARS: usize = 2000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Submission must be a JSON object")]
    NotAnObject,

    #[error("Request body is empty")]
    Empty,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// One optional slot per catalog field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveySubmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q2_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q4: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q4_why: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q5: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q5_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q6: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q7_slider: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q7: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q8_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q8: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q9: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q9_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q10_trust: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q10: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q11: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q11_other: Option<String>,
}

impl SurveySubmission {
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let object = value.as_object().ok_or(ValidationError::NotAnObject)?;

        if object.is_empty() {
            return Err(ValidationError::Empty);
        }

        let normalized = normalize(object)?;

        serde_json::from_value(Value::Object(normalized))
            .map_err(|e| invalid("submission", e.to_string()))
    }

    /// Loosely-typed view of the answers, used for statistics.
    pub fn to_record(&self) -> AnswerRecord {
        serde_json::to_value(self)
            .ok()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }
}

fn normalize(object: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    let mut normalized = Map::new();

    for (key, value) in object {
        if value.is_null() {
            continue;
        }

        if key == TIMESTAMP_FIELD {
            let timestamp = value
                .as_str()
                .ok_or_else(|| invalid(key, "expected a string"))?;
            normalized.insert(key.clone(), Value::String(timestamp.to_string()));
            continue;
        }

        let field = catalog::field(key).ok_or_else(|| ValidationError::UnknownField(key.clone()))?;

        if let Some(value) = normalize_value(key, field.kind, value)? {
            normalized.insert(key.clone(), value);
        }
    }

    if normalized.is_empty() {
        return Err(ValidationError::Empty);
    }

    Ok(normalized)
}

fn normalize_value(field: &str, kind: FieldKind, value: &Value) -> Result<Option<Value>, ValidationError> {
    match kind {
        FieldKind::FreeText => {
            let text = value.as_str().ok_or_else(|| invalid(field, "expected a string"))?.trim();

            if text.chars().count() > MAX_TEXT_CHARS {
                return Err(invalid(field, format!("longer than {MAX_TEXT_CHARS} characters")));
            }

            Ok((!text.is_empty()).then(|| Value::String(text.to_string())))
        }
        FieldKind::SingleChoice(options) => {
            let choice = value.as_str().ok_or_else(|| invalid(field, "expected a string"))?;

            if choice.is_empty() {
                return Ok(None);
            }
            if !options.contains(&choice) {
                return Err(invalid(field, format!("unknown option {choice:?}")));
            }

            Ok(Some(Value::String(choice.to_string())))
        }
        FieldKind::MultiChoice(options) | FieldKind::TagPicker(options) => {
            let items = value.as_array().ok_or_else(|| invalid(field, "expected a list"))?;
            let mut list = Vec::with_capacity(items.len());

            for item in items {
                let choice = item
                    .as_str()
                    .ok_or_else(|| invalid(field, "expected a list of strings"))?;

                if !options.contains(&choice) {
                    return Err(invalid(field, format!("unknown option {choice:?}")));
                }
                if !list.iter().any(|existing: &Value| existing == choice) {
                    list.push(Value::String(choice.to_string()));
                }
            }

            Ok(Some(Value::Array(list)))
        }
        FieldKind::Slider { .. } | FieldKind::StarRating => {
            let Some(number) = coerce_integer(field, value)? else {
                return Ok(None);
            };

            if !(RATING_MIN..=RATING_MAX).contains(&number) {
                return Err(invalid(
                    field,
                    format!("{number} is outside {RATING_MIN}..={RATING_MAX}"),
                ));
            }

            Ok(Some(Value::from(number)))
        }
    }
}

fn coerce_integer(field: &str, value: &Value) -> Result<Option<i64>, ValidationError> {
    match value {
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                return Ok(Some(integer));
            }

            match number.as_f64() {
                Some(float) if float.fract() == 0.0 => Ok(Some(float as i64)),
                _ => Err(invalid(field, "expected an integer")),
            }
        }
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(field, format!("{text:?} is not an integer"))),
        _ => Err(invalid(field, "expected an integer")),
    }
}

/// A persisted submission. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(flatten)]
    pub answers: SurveySubmission,
}
