//! Firestore REST API client.
//!
//! This crate provides:
//! - Document CRUD, structured queries and commits over the REST API
//! - Service account authentication via gcp_auth, or the local emulator
//! - Retry with exponential backoff and request metrics
//! - The `DocumentStore` implementation used in production

pub mod client;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod store;
pub mod token_cache;
pub mod types;


pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use retry::RetryConfig;
pub use token_cache::Credentials;
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};
