//! Stage 2: project a parsed value tree onto fixed-schema records.
//!
//! Shape violations abort the whole projection (the record count is fixed
//! up front from the array length and cannot be revised mid-way).
//! Per-field surprises on a well-shaped element never fail the record:
//! the field keeps its default and a [`FieldAnomaly`] is recorded.

use std::fmt;

use serde_json::{Map, Value};
use tracing::warn;

use super::{DecodeError, ValueKind};

/// Outcome of offering one key/value pair to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOutcome {
    /// Key recognized, value kind matched, field set.
    Applied,
    /// Key is not part of this record's schema.
    UnknownKey,
    /// Key recognized but the value has the wrong kind.
    KindMismatch { expected: ValueKind },
}

/// A fixed-schema record that can be projected from a JSON object.
///
/// Implementors start from [`Default`] and accept fields one key at a
/// time; all coercions are kind-exact (a string field never accepts a
/// number, a boolean field never accepts a string). Applied values are
/// owned copies -- nothing in a finished record borrows from the tree.
pub trait Record: Default {
    /// Schema name used in diagnostics.
    const NAME: &'static str;

    /// The recognized field keys, used to report missing keys.
    const FIELDS: &'static [&'static str];

    /// Offer one key/value pair to the record.
    fn apply_field(&mut self, key: &str, value: &Value) -> FieldOutcome;
}

/// A non-fatal per-field finding from projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAnomaly {
    /// Index of the element the finding belongs to (0 for a single-object
    /// projection).
    pub element: usize,
    /// The key in question.
    pub key: String,
    /// What was wrong.
    pub kind: AnomalyKind,
}

/// The kinds of per-field findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnomalyKind {
    /// The object carried a key outside the record schema.
    UnknownKey,
    /// A recognized key was absent; the field keeps its default.
    MissingKey,
    /// A recognized key carried a value of the wrong kind; the field
    /// keeps its default.
    KindMismatch { expected: ValueKind, found: ValueKind },
}

impl fmt::Display for FieldAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AnomalyKind::UnknownKey => {
                write!(f, "element {}: unrecognized key {:?}", self.element, self.key)
            }
            AnomalyKind::MissingKey => {
                write!(f, "element {}: missing key {:?}", self.element, self.key)
            }
            AnomalyKind::KindMismatch { expected, found } => write!(
                f,
                "element {}: key {:?} expected {expected}, found {found}",
                self.element, self.key
            ),
        }
    }
}

/// The result of a successful array projection: records in array order,
/// plus any per-field diagnostics gathered along the way.
#[derive(Debug, Clone, Default)]
pub struct Projection<R> {
    pub records: Vec<R>,
    pub anomalies: Vec<FieldAnomaly>,
}

/// Project a root array of objects onto a sequence of records.
///
/// The root must be an array and every element an object; either
/// violation is structural and aborts the projection. An empty array
/// yields zero records and no error.
pub fn project_array<R: Record>(root: &Value) -> Result<Projection<R>, DecodeError> {
    let Some(elements) = root.as_array() else {
        return Err(DecodeError::RootNotArray {
            found: ValueKind::of(root),
        });
    };

    let mut records = Vec::with_capacity(elements.len());
    let mut anomalies = Vec::new();

    for (index, element) in elements.iter().enumerate() {
        let Some(object) = element.as_object() else {
            return Err(DecodeError::ElementNotObject {
                index,
                found: ValueKind::of(element),
            });
        };
        records.push(project_one(object, index, &mut anomalies));
    }

    Ok(Projection { records, anomalies })
}

/// Project a root object onto a single record.
pub fn project_object<R: Record>(root: &Value) -> Result<(R, Vec<FieldAnomaly>), DecodeError> {
    let Some(object) = root.as_object() else {
        return Err(DecodeError::RootNotObject {
            found: ValueKind::of(root),
        });
    };

    let mut anomalies = Vec::new();
    let record = project_one(object, 0, &mut anomalies);
    Ok((record, anomalies))
}

fn project_one<R: Record>(
    object: &Map<String, Value>,
    element: usize,
    anomalies: &mut Vec<FieldAnomaly>,
) -> R {
    let mut record = R::default();

    for (key, value) in object {
        match record.apply_field(key, value) {
            FieldOutcome::Applied => {}
            FieldOutcome::UnknownKey => {
                warn!(record = R::NAME, element, key = %key, "unrecognized object key");
                anomalies.push(FieldAnomaly {
                    element,
                    key: key.clone(),
                    kind: AnomalyKind::UnknownKey,
                });
            }
            FieldOutcome::KindMismatch { expected } => {
                let found = ValueKind::of(value);
                warn!(
                    record = R::NAME, element, key = %key, %expected, %found,
                    "field value has the wrong kind"
                );
                anomalies.push(FieldAnomaly {
                    element,
                    key: key.clone(),
                    kind: AnomalyKind::KindMismatch { expected, found },
                });
            }
        }
    }

    for field in R::FIELDS {
        if !object.contains_key(*field) {
            anomalies.push(FieldAnomaly {
                element,
                key: (*field).to_owned(),
                kind: AnomalyKind::MissingKey,
            });
        }
    }

    record
}
