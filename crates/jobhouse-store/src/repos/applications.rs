//! Job application repository.

use std::sync::Arc;

use tracing::info;

use jobhouse_models::{InsertResult, JobApplication, JobApplicationDraft};

use super::decode_all;
use crate::error::StoreResult;
use crate::store::{DocumentStore, FieldFilter};

/// Repository for the append-only job applications collection.
#[derive(Clone)]
pub struct JobApplicationRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl JobApplicationRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub async fn create(&self, draft: &JobApplicationDraft) -> StoreResult<InsertResult> {
        let id = self.store.insert(&self.collection, draft.to_fields()).await?;
        info!(application_id = %id, email = draft.email().unwrap_or_default(), "Created job application");
        Ok(InsertResult::new(id))
    }

    /// All applications, or only those submitted by `email`.
    pub async fn list(&self, email: Option<&str>) -> StoreResult<Vec<JobApplication>> {
        let filter = email.map(|e| FieldFilter::eq("email", e));
        let records = self.store.find(&self.collection, filter.as_ref()).await?;
        decode_all(records)
    }

    pub async fn list_by_category(&self, category: &str) -> StoreResult<Vec<JobApplication>> {
        let filter = FieldFilter::eq("category", category);
        let records = self.store.find(&self.collection, Some(&filter)).await?;
        decode_all(records)
    }
}
