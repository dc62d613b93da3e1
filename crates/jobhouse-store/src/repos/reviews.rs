//! Customer review repository.

use std::sync::Arc;

use serde_json::{Map, Value};

use jobhouse_models::{InsertResult, Review, ID_FIELD};

use super::decode_all;
use crate::error::StoreResult;
use crate::store::DocumentStore;

/// Repository for the customer reviews collection.
#[derive(Clone)]
pub struct ReviewRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl ReviewRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub async fn list(&self) -> StoreResult<Vec<Review>> {
        let records = self.store.find(&self.collection, None).await?;
        decode_all(records)
    }

    /// Reviews are curated out of band; this is how they get seeded.
    pub async fn create(&self, mut fields: Map<String, Value>) -> StoreResult<InsertResult> {
        fields.remove(ID_FIELD);
        let id = self.store.insert(&self.collection, fields).await?;
        Ok(InsertResult::new(id))
    }
}
