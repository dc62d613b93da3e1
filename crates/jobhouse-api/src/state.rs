//! Application state.

use std::sync::Arc;

use jobhouse_firestore::FirestoreClient;
use jobhouse_store::{
    DocumentStore, JobApplicationRepository, JobRepository, MemoryStore, ReviewRepository,
};
use tracing::{info, warn};

use crate::auth::JwtKeys;
use crate::config::{ApiConfig, StoreBackend};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn DocumentStore>,
    pub jobs: JobRepository,
    pub applications: JobApplicationRepository,
    pub reviews: ReviewRepository,
    pub jwt: JwtKeys,
}

impl AppState {
    /// Create application state, connecting to the configured store.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store: Arc<dyn DocumentStore> = match config.store_backend {
            StoreBackend::Firestore => Arc::new(FirestoreClient::from_env().await?),
            StoreBackend::Memory => {
                warn!("Using the in-memory store; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };
        info!(backend = store.backend(), "Document store ready");
        Ok(Self::with_store(config, store))
    }

    /// Create application state over an existing store.
    pub fn with_store(config: ApiConfig, store: Arc<dyn DocumentStore>) -> Self {
        let collections = &config.collections;
        Self {
            jobs: JobRepository::new(Arc::clone(&store), collections.jobs.clone()),
            applications: JobApplicationRepository::new(
                Arc::clone(&store),
                collections.applications.clone(),
            ),
            reviews: ReviewRepository::new(Arc::clone(&store), collections.reviews.clone()),
            jwt: JwtKeys::new(&config.token_secret, config.token_ttl_hours),
            store,
            config,
        }
    }
}
