//! Document store abstraction.
//!
//! This crate provides:
//! - The `DocumentStore` trait handlers depend on, instead of a global client
//! - An in-memory implementation for tests and local development
//! - Typed repositories for jobs, job applications and reviews

pub mod error;
pub mod memory;
pub mod repos;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use repos::{JobApplicationRepository, JobRepository, ReviewRepository};
pub use store::{DocumentStore, FieldFilter, Record};
