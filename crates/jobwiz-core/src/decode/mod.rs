//! Two-stage decoding of captured worker output.
//!
//! Stage 1 ([`parse`]) turns the raw text into a generic
//! [`serde_json::Value`] tree. Stage 2 ([`project_array`] /
//! [`project_object`]) projects that tree onto fixed-schema records,
//! tolerating unknown, missing, and mis-kinded fields per element while
//! treating shape violations (root not an array, element not an object)
//! as fatal.
//!
//! The worker also reports outcomes as small single-key objects --
//! `{"error": ...}`, `{"warning": ...}`, `{"success": ...}` and per-task
//! acknowledgement keys. [`envelope`] and [`ack_field`] recognize those
//! before any record projection is attempted.
//!
//! Everything the worker writes is untrusted and fully re-validated here;
//! a well-formed exit status says nothing about the output's shape.

mod project;
mod records;

pub use project::{
    AnomalyKind, FieldAnomaly, FieldOutcome, Projection, Record, project_array, project_object,
};
pub use records::{Candidate, JobDetail, JobSummary};

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// The kind of a JSON value, for schema diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// The kind of `value`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// Errors from decoding captured output.
///
/// [`DecodeError::Parse`] is a Stage 1 (syntactic) failure; the other
/// variants are Stage 2 (structural) failures. Per-field surprises on an
/// element that *is* an object are not errors -- they are recorded as
/// [`FieldAnomaly`] diagnostics instead.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The captured text is not valid JSON.
    #[error("worker output is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Record projection expected an array at the root.
    #[error("expected a JSON array at the root, found {found}")]
    RootNotArray { found: ValueKind },

    /// Single-record projection expected an object at the root.
    #[error("expected a JSON object at the root, found {found}")]
    RootNotObject { found: ValueKind },

    /// An element of the root array is not an object.
    #[error("element {index} is not a JSON object, found {found}")]
    ElementNotObject { index: usize, found: ValueKind },

    /// An acknowledgement object is missing its expected key, or the
    /// key's value is not a string.
    #[error("expected acknowledgement field {key:?} with a string value")]
    MissingAckField { key: &'static str },
}

/// Stage 1: parse the captured text into a generic value tree.
pub fn parse(text: &str) -> Result<Value, DecodeError> {
    Ok(serde_json::from_str(text)?)
}

/// A worker-level report, delivered as a single-key root object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// `{"error": "..."}` -- the worker rejected the request.
    Error(String),
    /// `{"warning": "..."}` -- e.g. "No matching jobs found".
    Warning(String),
    /// `{"success": "..."}` -- acknowledgement for tasks with no payload.
    Success(String),
}

impl Envelope {
    /// The report's message text.
    pub fn message(&self) -> &str {
        match self {
            Envelope::Error(m) | Envelope::Warning(m) | Envelope::Success(m) => m,
        }
    }
}

/// Recognize a worker report envelope at the root of a parsed tree.
///
/// Returns `None` for anything that is not an object carrying one of the
/// three report keys with a string value; such values flow on to record
/// projection (where a bare object root is a schema error).
pub fn envelope(root: &Value) -> Option<Envelope> {
    let object = root.as_object()?;
    if let Some(message) = object.get("error").and_then(Value::as_str) {
        return Some(Envelope::Error(message.to_owned()));
    }
    if let Some(message) = object.get("warning").and_then(Value::as_str) {
        return Some(Envelope::Warning(message.to_owned()));
    }
    if let Some(message) = object.get("success").and_then(Value::as_str) {
        return Some(Envelope::Success(message.to_owned()));
    }
    None
}

/// Extract a string acknowledgement field (`job_id`, `modified_job_id`,
/// `applied_job_id`, `success`) from a root object.
pub fn ack_field(root: &Value, key: &'static str) -> Result<String, DecodeError> {
    let object = root
        .as_object()
        .ok_or(DecodeError::RootNotObject {
            found: ValueKind::of(root),
        })?;
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(DecodeError::MissingAckField { key })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_valid_json() {
        let root = parse(r#"[{"job_id":"J1"}]"#).unwrap();
        assert!(root.is_array());
    }

    #[test]
    fn parse_surfaces_syntactic_detail() {
        let err = parse("this is not json").expect_err("should fail");
        let msg = err.to_string();
        assert!(
            msg.contains("not valid JSON"),
            "message should name the stage, got: {msg}"
        );
        assert!(matches!(err, DecodeError::Parse(_)));
    }

    #[test]
    fn value_kind_of_covers_all_variants() {
        assert_eq!(ValueKind::of(&Value::Null), ValueKind::Null);
        assert_eq!(ValueKind::of(&serde_json::json!(true)), ValueKind::Boolean);
        assert_eq!(ValueKind::of(&serde_json::json!(3)), ValueKind::Number);
        assert_eq!(ValueKind::of(&serde_json::json!("x")), ValueKind::String);
        assert_eq!(ValueKind::of(&serde_json::json!([])), ValueKind::Array);
        assert_eq!(ValueKind::of(&serde_json::json!({})), ValueKind::Object);
    }

    #[test]
    fn value_kind_display_is_lowercase() {
        assert_eq!(ValueKind::Object.to_string(), "object");
        assert_eq!(ValueKind::Array.to_string(), "array");
    }

    #[test]
    fn envelope_recognizes_error() {
        let root = parse(r#"{ "error" : "Connection to DB failed" }"#).unwrap();
        assert_eq!(
            envelope(&root),
            Some(Envelope::Error("Connection to DB failed".to_owned()))
        );
    }

    #[test]
    fn envelope_recognizes_warning() {
        let root = parse(r#"{ "warning" : "No matching jobs found"}"#).unwrap();
        assert_eq!(
            envelope(&root),
            Some(Envelope::Warning("No matching jobs found".to_owned()))
        );
    }

    #[test]
    fn envelope_recognizes_success() {
        let root = parse(r#"{ "success" : "Registered user a@b.com"}"#).unwrap();
        let env = envelope(&root).unwrap();
        assert_eq!(env.message(), "Registered user a@b.com");
        assert!(matches!(env, Envelope::Success(_)));
    }

    #[test]
    fn envelope_ignores_arrays_and_plain_objects() {
        assert_eq!(envelope(&parse("[]").unwrap()), None);
        assert_eq!(envelope(&parse(r#"{"job_id":"J1"}"#).unwrap()), None);
    }

    #[test]
    fn envelope_requires_a_string_message() {
        // An "error" key with a non-string value is not a report envelope.
        assert_eq!(envelope(&parse(r#"{"error": 42}"#).unwrap()), None);
    }

    #[test]
    fn ack_field_extracts_the_key() {
        let root = parse(r#"{ "job_id" : "feed0042" }"#).unwrap();
        assert_eq!(ack_field(&root, "job_id").unwrap(), "feed0042");
    }

    #[test]
    fn ack_field_rejects_non_object_root() {
        let err = ack_field(&parse("[]").unwrap(), "job_id").expect_err("array root");
        assert!(
            matches!(
                err,
                DecodeError::RootNotObject {
                    found: ValueKind::Array
                }
            ),
            "got: {err:?}"
        );
    }

    #[test]
    fn ack_field_rejects_missing_or_miskinded_key() {
        let missing = ack_field(&parse("{}").unwrap(), "job_id").expect_err("missing");
        assert!(matches!(missing, DecodeError::MissingAckField { key: "job_id" }));

        let miskinded =
            ack_field(&parse(r#"{"job_id": 7}"#).unwrap(), "job_id").expect_err("number");
        assert!(matches!(miskinded, DecodeError::MissingAckField { key: "job_id" }));
    }
}
