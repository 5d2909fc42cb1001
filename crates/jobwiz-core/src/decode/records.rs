//! The record schemas the worker's responses project onto.
//!
//! Field values are owned copies taken out of the parsed tree; date
//! strings are carried verbatim (calendar correctness is not checked).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ValueKind;
use super::project::{FieldOutcome, Record};

fn string_field(slot: &mut String, value: &Value) -> FieldOutcome {
    match value.as_str() {
        Some(s) => {
            *slot = s.to_owned();
            FieldOutcome::Applied
        }
        None => FieldOutcome::KindMismatch {
            expected: ValueKind::String,
        },
    }
}

fn bool_field(slot: &mut bool, value: &Value) -> FieldOutcome {
    match value.as_bool() {
        Some(b) => {
            *slot = b;
            FieldOutcome::Applied
        }
        None => FieldOutcome::KindMismatch {
            expected: ValueKind::Boolean,
        },
    }
}

fn int_field(slot: &mut i64, value: &Value) -> FieldOutcome {
    match value.as_i64() {
        Some(n) => {
            *slot = n;
            FieldOutcome::Applied
        }
        None => FieldOutcome::KindMismatch {
            expected: ValueKind::Number,
        },
    }
}

/// One row of a job search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_id: String,
    pub title: String,
    pub is_open: bool,
    pub date_posted: String,
}

impl Record for JobSummary {
    const NAME: &'static str = "job summary";
    const FIELDS: &'static [&'static str] = &["job_id", "title", "is_open", "date_posted"];

    fn apply_field(&mut self, key: &str, value: &Value) -> FieldOutcome {
        match key {
            "job_id" => string_field(&mut self.job_id, value),
            "title" => string_field(&mut self.title, value),
            "is_open" => bool_field(&mut self.is_open, value),
            "date_posted" => string_field(&mut self.date_posted, value),
            _ => FieldOutcome::UnknownKey,
        }
    }
}

/// Full detail for one job posting, as returned by the `detail` task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDetail {
    pub job_id: String,
    pub creator: String,
    pub title: String,
    pub description: String,
    pub min_education: i64,
    pub min_experience: i64,
    pub salary: i64,
    pub is_open: bool,
    pub date_posted: String,
}

impl Record for JobDetail {
    const NAME: &'static str = "job detail";
    const FIELDS: &'static [&'static str] = &[
        "job_id",
        "creator",
        "title",
        "description",
        "min_education",
        "min_experience",
        "salary",
        "is_open",
        "date_posted",
    ];

    fn apply_field(&mut self, key: &str, value: &Value) -> FieldOutcome {
        match key {
            "job_id" => string_field(&mut self.job_id, value),
            "creator" => string_field(&mut self.creator, value),
            "title" => string_field(&mut self.title, value),
            "description" => string_field(&mut self.description, value),
            "min_education" => int_field(&mut self.min_education, value),
            "min_experience" => int_field(&mut self.min_experience, value),
            "salary" => int_field(&mut self.salary, value),
            "is_open" => bool_field(&mut self.is_open, value),
            "date_posted" => string_field(&mut self.date_posted, value),
            _ => FieldOutcome::UnknownKey,
        }
    }
}

/// One applicant for a job, as returned by the `candidates` task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub applied_date: String,
}

impl Record for Candidate {
    const NAME: &'static str = "candidate";
    const FIELDS: &'static [&'static str] = &["email", "name", "phone", "applied_date"];

    fn apply_field(&mut self, key: &str, value: &Value) -> FieldOutcome {
        match key {
            "email" => string_field(&mut self.email, value),
            "name" => string_field(&mut self.name, value),
            "phone" => string_field(&mut self.phone, value),
            "applied_date" => string_field(&mut self.applied_date, value),
            _ => FieldOutcome::UnknownKey,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{parse, project_array, project_object};

    #[test]
    fn summary_round_trips_through_json() {
        let original = JobSummary {
            job_id: "J1".to_owned(),
            title: "Engineer".to_owned(),
            is_open: true,
            date_posted: "2025-01-01".to_owned(),
        };

        // Encode the record, then decode the array it sits in.
        let encoded = serde_json::to_string(&vec![&original]).unwrap();
        let projection = project_array::<JobSummary>(&parse(&encoded).unwrap()).unwrap();

        assert_eq!(projection.records, vec![original]);
        assert!(projection.anomalies.is_empty());
    }

    #[test]
    fn detail_projects_from_a_root_object() {
        let root = parse(
            r#"{
                "job_id": "J7",
                "creator": "boss@corp.com",
                "title": "Engineer",
                "description": "Build things.",
                "min_education": 2,
                "min_experience": 3,
                "salary": 90000,
                "is_open": true,
                "date_posted": "2025-01-01"
            }"#,
        )
        .unwrap();

        let (detail, anomalies) = project_object::<JobDetail>(&root).unwrap();
        assert!(anomalies.is_empty());
        assert_eq!(detail.job_id, "J7");
        assert_eq!(detail.creator, "boss@corp.com");
        assert_eq!(detail.min_education, 2);
        assert_eq!(detail.min_experience, 3);
        assert_eq!(detail.salary, 90000);
        assert!(detail.is_open);
    }

    #[test]
    fn detail_integer_fields_are_kind_exact() {
        let root = parse(
            r#"{
                "job_id": "J7",
                "creator": "boss@corp.com",
                "title": "Engineer",
                "description": "Build things.",
                "min_education": "2",
                "min_experience": 3,
                "salary": 90000,
                "is_open": true,
                "date_posted": "2025-01-01"
            }"#,
        )
        .unwrap();

        let (detail, anomalies) = project_object::<JobDetail>(&root).unwrap();
        assert_eq!(detail.min_education, 0, "string \"2\" must not coerce");
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].key, "min_education");
    }

    #[test]
    fn candidates_project_from_an_array() {
        let root = parse(
            r#"[
                {"email":"a@b.com","name":"Ann Bee","phone":"0812345678","applied_date":"2025-04-01"},
                {"email":"c@d.com","name":"Cee Dee","phone":"0898765432","applied_date":"2025-04-02"}
            ]"#,
        )
        .unwrap();

        let projection = project_array::<Candidate>(&root).unwrap();
        assert_eq!(projection.records.len(), 2);
        assert_eq!(projection.records[0].name, "Ann Bee");
        assert_eq!(projection.records[1].phone, "0898765432");
        assert!(projection.anomalies.is_empty());
    }

    #[test]
    fn over_length_values_are_kept_whole() {
        let long_title = "X".repeat(500);
        let encoded = format!(
            r#"[{{"job_id":"J1","title":"{long_title}","is_open":true,"date_posted":"2025-01-01"}}]"#
        );
        let projection = project_array::<JobSummary>(&parse(&encoded).unwrap()).unwrap();
        assert_eq!(projection.records[0].title.len(), 500);
    }
}
