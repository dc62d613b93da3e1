//! In-memory document store.
//!
//! Used by the test suites and by `STORE_BACKEND=memory` for local runs.
//! Collections keep insertion order, so scans are deterministic.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::store::{DocumentStore, FieldFilter, Record};

/// Process-local store. Every operation takes the single lock, which also
/// makes `increment` atomic.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, collection: &str, fields: Map<String, Value>) -> StoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(Record::new(id.clone(), fields));
        debug!(collection = %collection, id = %id, "Inserted document");
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Record>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|r| r.id == id))
            .cloned())
    }

    async fn find(&self, collection: &str, filter: Option<&FieldFilter>) -> StoreResult<Vec<Record>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .filter(|r| filter.map_or(true, |f| f.matches(&r.fields)))
            .cloned()
            .collect())
    }

    async fn replace_fields(
        &self,
        collection: &str,
        id: &str,
        mut fields: Map<String, Value>,
        field_paths: &[&str],
    ) -> StoreResult<bool> {
        let mut collections = self.collections.write().await;
        let Some(record) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|r| r.id == id))
        else {
            return Ok(false);
        };

        for path in field_paths {
            match fields.remove(*path) {
                Some(value) => {
                    record.fields.insert(path.to_string(), value);
                }
                None => {
                    record.fields.remove(*path);
                }
            }
        }
        Ok(true)
    }

    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        by: i64,
    ) -> StoreResult<Option<i64>> {
        let mut collections = self.collections.write().await;
        let Some(record) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|r| r.id == id))
        else {
            return Ok(None);
        };

        let current = record.fields.get(field);
        let (stored, next) = match current {
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => {
                let next = n.as_i64().unwrap_or(i64::MAX).saturating_add(by);
                (Value::from(next), next)
            }
            Some(Value::Number(n)) => {
                let next = n.as_f64().unwrap_or_default() + by as f64;
                (Value::from(next), next as i64)
            }
            _ => (Value::from(by), by),
        };
        record.fields.insert(field.to_string(), stored);
        Ok(Some(next))
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|r| r.id != id);
        Ok(docs.len() != before)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
