//! `DocumentStore` backed by Firestore.

use async_trait::async_trait;
use serde_json::{Map, Value as Json};

use jobhouse_store::{DocumentStore, FieldFilter, Record, StoreError, StoreResult};

use crate::client::FirestoreClient;
use crate::error::FirestoreError;
use crate::types::{fields_from_json, Document, StructuredQuery, ToFirestoreValue};

/// Collection read by readiness checks; the document need not exist.
const PING_COLLECTION: &str = "_health";

impl From<FirestoreError> for StoreError {
    fn from(e: FirestoreError) -> Self {
        if e.is_unavailable() {
            StoreError::unavailable(e.to_string())
        } else {
            StoreError::backend(e.to_string())
        }
    }
}

fn into_record(doc: Document) -> StoreResult<Record> {
    let id = doc
        .id()
        .ok_or_else(|| StoreError::backend("Firestore returned a document without a name"))?
        .to_string();
    Ok(Record::new(id, doc.to_json_fields()))
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    fn backend(&self) -> &'static str {
        "firestore"
    }

    async fn insert(&self, collection: &str, fields: Map<String, Json>) -> StoreResult<String> {
        let doc = self
            .create_document(collection, fields_from_json(&fields))
            .await?;
        Ok(into_record(doc)?.id)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Record>> {
        self.get_document(collection, id)
            .await?
            .map(into_record)
            .transpose()
    }

    async fn find(&self, collection: &str, filter: Option<&FieldFilter>) -> StoreResult<Vec<Record>> {
        let query = StructuredQuery::collection(
            collection,
            filter.map(|f| (f.field.as_str(), f.value.to_firestore_value())),
        );
        self.run_query(query)
            .await?
            .into_iter()
            .map(into_record)
            .collect()
    }

    async fn replace_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Json>,
        field_paths: &[&str],
    ) -> StoreResult<bool> {
        let updated = self
            .update_document(collection, id, fields_from_json(&fields), field_paths)
            .await?;
        Ok(updated.is_some())
    }

    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        by: i64,
    ) -> StoreResult<Option<i64>> {
        Ok(self.increment_field(collection, id, field, by).await?)
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        Ok(self.delete_document(collection, id).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.get_document(PING_COLLECTION, "ping").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors_map_to_unavailable() {
        let err: StoreError = FirestoreError::ServerError(503, "down".into()).into();
        assert!(matches!(err, StoreError::Unavailable(_)));

        let err: StoreError = FirestoreError::auth_error("no credentials").into();
        assert!(matches!(err, StoreError::Unavailable(_)));

        let err: StoreError = FirestoreError::PermissionDenied("rules".into()).into();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[test]
    fn test_nameless_document_is_rejected() {
        assert!(into_record(Document::default()).is_err());
    }
}
