//! Shared data models for the Job House backend.
//!
//! This crate provides Serde-serializable types for:
//! - Job listings and the fields a listing can be replaced with
//! - Job applications and customer reviews
//! - Write acknowledgements returned to the client
//! - Document id validation

pub mod application;
pub mod job;
pub mod review;
pub mod utils;
pub mod write_result;

// Re-export common types
pub use application::{JobApplication, JobApplicationDraft};
pub use job::{Job, JobDraft, APPLICANTS_FIELD, JOB_FIELDS};
pub use review::Review;
pub use utils::{validate_document_id, DocumentIdError, ID_FIELD};
pub use write_result::{DeleteResult, InsertResult, UpdateResult};
