//! Job listing repository.

use std::sync::Arc;

use tracing::info;

use jobhouse_models::{
    validate_document_id, DeleteResult, InsertResult, Job, JobDraft, UpdateResult,
    APPLICANTS_FIELD, JOB_FIELDS,
};

use super::decode_all;
use crate::error::StoreResult;
use crate::store::{DocumentStore, FieldFilter};

/// Repository for the jobs collection.
#[derive(Clone)]
pub struct JobRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl JobRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// All jobs.
    pub async fn list(&self) -> StoreResult<Vec<Job>> {
        self.list_where(None).await
    }

    /// Jobs posted by `email`.
    pub async fn list_by_email(&self, email: &str) -> StoreResult<Vec<Job>> {
        self.list_where(Some(FieldFilter::eq("email", email))).await
    }

    /// Jobs whose `category` equals `category` exactly.
    pub async fn list_by_category(&self, category: &str) -> StoreResult<Vec<Job>> {
        self.list_where(Some(FieldFilter::eq("category", category))).await
    }

    /// Jobs whose `jobTitle` equals `title` exactly.
    pub async fn list_by_title(&self, title: &str) -> StoreResult<Vec<Job>> {
        self.list_where(Some(FieldFilter::eq("jobTitle", title))).await
    }

    async fn list_where(&self, filter: Option<FieldFilter>) -> StoreResult<Vec<Job>> {
        let records = self.store.find(&self.collection, filter.as_ref()).await?;
        decode_all(records)
    }

    /// Fetch one job by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<Job>> {
        validate_document_id(id)?;
        match self.store.get(&self.collection, id).await? {
            Some(record) => Ok(Some(record.decode()?)),
            None => Ok(None),
        }
    }

    /// Insert a new job listing.
    pub async fn create(&self, draft: &JobDraft) -> StoreResult<InsertResult> {
        let id = self.store.insert(&self.collection, draft.to_fields()).await?;
        info!(job_id = %id, email = draft.email().unwrap_or_default(), "Created job");
        Ok(InsertResult::new(id))
    }

    /// Overwrite every listed job field; extra fields stay as they were.
    pub async fn replace(&self, id: &str, draft: &JobDraft) -> StoreResult<UpdateResult> {
        validate_document_id(id)?;
        let matched = self
            .store
            .replace_fields(&self.collection, id, draft.listed_fields(), &JOB_FIELDS)
            .await?;
        info!(job_id = %id, matched, "Replaced job");
        Ok(UpdateResult::single(matched))
    }

    /// Add one to the applicant counter.
    pub async fn increment_applicants(&self, id: &str) -> StoreResult<UpdateResult> {
        validate_document_id(id)?;
        let applicants = self
            .store
            .increment(&self.collection, id, APPLICANTS_FIELD, 1)
            .await?;
        if let Some(n) = applicants {
            info!(job_id = %id, applicants = n, "Incremented applicants");
        }
        Ok(UpdateResult::single(applicants.is_some()))
    }

    /// Delete one job by id.
    pub async fn delete(&self, id: &str) -> StoreResult<DeleteResult> {
        validate_document_id(id)?;
        let deleted = self.store.delete(&self.collection, id).await?;
        info!(job_id = %id, deleted, "Deleted job");
        Ok(DeleteResult::single(deleted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::MemoryStore;
    use serde_json::{json, Map, Value};

    fn repo() -> JobRepository {
        JobRepository::new(Arc::new(MemoryStore::new()), "jobs")
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn draft(title: &str, category: &str, email: &str) -> JobDraft {
        JobDraft::from(object(json!({
            "jobTitle": title,
            "category": category,
            "email": email,
            "applicantsNumber": 0
        })))
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_fields() {
        let repo = repo();
        let mut submitted = draft("Engineer", "Tech", "a@x.com");
        submitted.fields.insert("salaryRange".into(), json!("$100k - $120k"));
        submitted.fields.insert("remote".into(), json!(true));

        let inserted = repo.create(&submitted).await.unwrap();
        let job = repo.get(&inserted.inserted_id).await.unwrap().unwrap();

        assert_eq!(job.id, inserted.inserted_id);
        assert_eq!(job.fields, submitted.to_fields());
        assert_eq!(job.get("remote"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_loosely_typed_fields_round_trip() {
        let repo = repo();
        let mut submitted = draft("Engineer", "Tech", "a@x.com");
        submitted.fields.insert("salaryRange".into(), json!(5000));
        submitted.fields.insert("imgUrl".into(), Value::Null);
        submitted.fields.insert("applicantsNumber".into(), json!("0"));

        let id = repo.create(&submitted).await.unwrap().inserted_id;
        let job = repo.get(&id).await.unwrap().unwrap();

        assert_eq!(job.get("salaryRange"), Some(&json!(5000)));
        assert_eq!(job.get("imgUrl"), Some(&Value::Null));
        assert_eq!(job.get("applicantsNumber"), Some(&json!("0")));
    }

    #[tokio::test]
    async fn test_listing_keeps_documents_of_any_shape() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert(
                "jobs",
                object(json!({ "jobTitle": "Engineer", "category": "Tech", "salaryRange": 5000 })),
            )
            .await
            .unwrap();
        store
            .insert("jobs", object(json!({ "category": "Tech", "jobTitle": ["a", "b"] })))
            .await
            .unwrap();
        store.insert("jobs", Map::new()).await.unwrap();
        let repo = JobRepository::new(store, "jobs");

        assert_eq!(repo.list().await.unwrap().len(), 3);
        let tech = repo.list_by_category("Tech").await.unwrap();
        assert_eq!(tech.len(), 2);
        assert_eq!(tech[0].get("salaryRange"), Some(&json!(5000)));
    }

    #[tokio::test]
    async fn test_increment_scenario() {
        let repo = repo();
        let inserted = repo.create(&draft("Engineer", "Tech", "a@x.com")).await.unwrap();

        let result = repo.increment_applicants(&inserted.inserted_id).await.unwrap();
        assert_eq!(result, UpdateResult::single(true));

        let job = repo.get(&inserted.inserted_id).await.unwrap().unwrap();
        assert_eq!(job.applicants(), Some(1));
    }

    #[tokio::test]
    async fn test_increment_n_times() {
        let repo = repo();
        let mut initial = draft("Engineer", "Tech", "a@x.com");
        initial.fields.insert("applicantsNumber".into(), json!(7));
        let id = repo.create(&initial).await.unwrap().inserted_id;

        for _ in 0..12 {
            repo.increment_applicants(&id).await.unwrap();
        }

        assert_eq!(repo.get(&id).await.unwrap().unwrap().applicants(), Some(19));
    }

    #[tokio::test]
    async fn test_increment_non_numeric_counter_restarts() {
        let repo = repo();
        let mut initial = draft("Engineer", "Tech", "a@x.com");
        initial.fields.insert("applicantsNumber".into(), json!("0"));
        let id = repo.create(&initial).await.unwrap().inserted_id;

        let result = repo.increment_applicants(&id).await.unwrap();
        assert_eq!(result.matched_count, 1);
        assert_eq!(repo.get(&id).await.unwrap().unwrap().applicants(), Some(1));
    }

    #[tokio::test]
    async fn test_increment_missing_job_matches_nothing() {
        let result = repo().increment_applicants("missing").await.unwrap();
        assert_eq!(result.matched_count, 0);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_none() {
        let repo = repo();
        let id = repo
            .create(&draft("Engineer", "Tech", "a@x.com"))
            .await
            .unwrap()
            .inserted_id;

        assert_eq!(repo.delete(&id).await.unwrap().deleted_count, 1);
        assert!(repo.get(&id).await.unwrap().is_none());
        assert_eq!(repo.delete(&id).await.unwrap().deleted_count, 0);
    }

    #[tokio::test]
    async fn test_list_by_category_is_exact_subset() {
        let repo = repo();
        let categories = ["Tech", "Design", "Tech", "Sales", "tech", "Tech"];
        for (i, category) in categories.iter().enumerate() {
            repo.create(&draft(&format!("Job {i}"), category, "a@x.com"))
                .await
                .unwrap();
        }

        let tech = repo.list_by_category("Tech").await.unwrap();
        assert_eq!(tech.len(), 3);
        assert!(tech.iter().all(|j| j.category() == Some("Tech")));

        assert_eq!(repo.list().await.unwrap().len(), categories.len());
        assert!(repo.list_by_category("Legal").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_email_and_title() {
        let repo = repo();
        repo.create(&draft("Engineer", "Tech", "a@x.com")).await.unwrap();
        repo.create(&draft("Designer", "Design", "b@x.com")).await.unwrap();
        repo.create(&draft("Engineer", "Tech", "b@x.com")).await.unwrap();

        assert_eq!(repo.list_by_email("b@x.com").await.unwrap().len(), 2);
        assert_eq!(repo.list_by_title("Engineer").await.unwrap().len(), 2);
        assert_eq!(repo.list_by_title("Designer").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_overwrites_listed_fields() {
        let repo = repo();
        let mut first = draft("Engineer", "Tech", "a@x.com");
        first.fields.insert("location".into(), json!("Dhaka"));
        first.fields.insert("remote".into(), json!(true));
        let id = repo.create(&first).await.unwrap().inserted_id;

        let replacement = draft("Senior Engineer", "Engineering", "a@x.com");
        let result = repo.replace(&id, &replacement).await.unwrap();
        assert_eq!(result.matched_count, 1);

        let job = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(job.get("jobTitle"), Some(&json!("Senior Engineer")));
        assert_eq!(job.category(), Some("Engineering"));
        assert_eq!(job.get("location"), Some(&json!("")));
        assert_eq!(job.get("remote"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_replace_missing_job_matches_nothing() {
        let result = repo()
            .replace("missing", &draft("Engineer", "Tech", "a@x.com"))
            .await
            .unwrap();
        assert_eq!(result, UpdateResult::single(false));
    }

    #[tokio::test]
    async fn test_malformed_id_is_rejected_before_store() {
        let err = repo().get("jobs/escape").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }
}
