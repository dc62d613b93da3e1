//! Job listing models.
//!
//! Listings are loosely typed: every field is stored as the client sent it.
//! Only `email` and `jobTitle` are checked on write, and absent listed
//! fields are filled with their defaults.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::utils::strip_id;

/// Counter field bumped every time someone applies to a job.
pub const APPLICANTS_FIELD: &str = "applicantsNumber";

/// Fields owned by a job listing; a replace overwrites exactly these.
pub const JOB_FIELDS: [&str; 11] = [
    "postedBy",
    "email",
    "jobTitle",
    "category",
    "description",
    "imgUrl",
    "location",
    "salaryRange",
    "jobPostingDate",
    "applicationDeadline",
    APPLICANTS_FIELD,
];

fn default_for(field: &str) -> Value {
    if field == APPLICANTS_FIELD {
        Value::from(0)
    } else {
        Value::String(String::new())
    }
}

fn text<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    fields.get(name).and_then(Value::as_str)
}

/// Job fields as submitted by the client, without an identifier.
///
/// Any JSON object is accepted; fields beyond the listed ones are stored
/// alongside the listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobDraft {
    pub fields: Map<String, Value>,
}

impl From<Map<String, Value>> for JobDraft {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl JobDraft {
    /// Poster email, when sent as a string.
    pub fn email(&self) -> Option<&str> {
        text(&self.fields, "email")
    }

    pub fn job_title(&self) -> Option<&str> {
        text(&self.fields, "jobTitle")
    }

    /// All fields to persist for a new listing.
    ///
    /// A client-supplied `_id` is dropped: identifiers belong to the store.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = self.fields.clone();
        strip_id(&mut fields);
        for name in JOB_FIELDS {
            if !fields.contains_key(name) {
                fields.insert(name.to_string(), default_for(name));
            }
        }
        fields
    }

    /// Only the listed job fields, for a full replace.
    pub fn listed_fields(&self) -> Map<String, Value> {
        let mut fields = self.to_fields();
        fields.retain(|key, _| JOB_FIELDS.contains(&key.as_str()));
        fields
    }
}

impl Validate for JobDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.email().is_some_and(|email| email.validate_email()) {
            errors.add(
                "email",
                ValidationError::new("email")
                    .with_message(Cow::Borrowed("email must be a valid address")),
            );
        }
        if self.job_title().map_or(true, str::is_empty) {
            errors.add(
                "jobTitle",
                ValidationError::new("length")
                    .with_message(Cow::Borrowed("jobTitle must not be empty")),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A stored job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Store-assigned identifier
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Job {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn category(&self) -> Option<&str> {
        text(&self.fields, "category")
    }

    /// Applicant counter, when it holds a number.
    pub fn applicants(&self) -> Option<i64> {
        let value = self.fields.get(APPLICANTS_FIELD)?;
        value.as_i64().or_else(|| value.as_f64().map(|n| n as i64))
    }
}
