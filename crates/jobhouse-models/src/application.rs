//! Job application models.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::utils::strip_id;

/// A job application as submitted by the applicant.
///
/// Only `email` and `category` are interpreted by the backend; everything
/// else (resume link, cover letter, job id...) is stored as sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobApplicationDraft {
    pub fields: Map<String, Value>,
}

impl From<Map<String, Value>> for JobApplicationDraft {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl JobApplicationDraft {
    pub fn email(&self) -> Option<&str> {
        self.fields.get("email").and_then(Value::as_str)
    }

    /// All fields to persist, minus any client-supplied `_id`.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = self.fields.clone();
        strip_id(&mut fields);
        fields
    }
}

impl Validate for JobApplicationDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        if self.email().is_some_and(|email| email.validate_email()) {
            return Ok(());
        }
        let mut errors = ValidationErrors::new();
        errors.add(
            "email",
            ValidationError::new("email").with_message(Cow::Borrowed("email must be a valid address")),
        );
        Err(errors)
    }
}

/// A stored job application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl JobApplication {
    pub fn email(&self) -> Option<&str> {
        self.fields.get("email").and_then(Value::as_str)
    }
}
