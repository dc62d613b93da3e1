//! The document store seam.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use jobhouse_models::ID_FIELD;

use crate::error::{StoreError, StoreResult};

/// One stored document: its identifier plus a JSON object of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Client view of the record: the fields with the id under `_id`.
    pub fn into_json(self) -> Value {
        let mut fields = self.fields;
        fields.insert(ID_FIELD.to_string(), Value::String(self.id));
        Value::Object(fields)
    }

    /// Decode into a typed model.
    pub fn decode<T: DeserializeOwned>(self) -> StoreResult<T> {
        let id = self.id.clone();
        serde_json::from_value(self.into_json()).map_err(|e| StoreError::malformed(id, e))
    }
}

/// Equality filter on a single top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, fields: &Map<String, Value>) -> bool {
        fields.get(&self.field) == Some(&self.value)
    }
}

/// A schema-flexible document database addressed by collection and id.
///
/// Implementations must be safe for concurrent use; handlers share one
/// instance behind an `Arc`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and readiness output.
    fn backend(&self) -> &'static str;

    /// Insert a document and return its store-generated id.
    async fn insert(&self, collection: &str, fields: Map<String, Value>) -> StoreResult<String>;

    /// Fetch one document, `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Record>>;

    /// Scan a collection, optionally keeping only documents matching `filter`.
    async fn find(&self, collection: &str, filter: Option<&FieldFilter>) -> StoreResult<Vec<Record>>;

    /// Overwrite `field_paths` of an existing document with the values in
    /// `fields`; paths absent from `fields` are removed. Other fields are
    /// left untouched. Returns `false` if the document does not exist.
    async fn replace_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        field_paths: &[&str],
    ) -> StoreResult<bool>;

    /// Atomically add `by` to a numeric field and return the new value.
    ///
    /// Integers stay integers and doubles stay doubles (the returned value is
    /// truncated). A missing or non-numeric field is set to `by`. Returns
    /// `None` if the document does not exist.
    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        by: i64,
    ) -> StoreResult<Option<i64>>;

    /// Delete a document. Returns `false` if it did not exist.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool>;

    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> StoreResult<()>;
}
