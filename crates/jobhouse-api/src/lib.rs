//! Axum HTTP API server.
//!
//! This crate provides:
//! - Job, job application and review endpoints over a `DocumentStore`
//! - Cookie-carried HS256 token issuance and verification
//! - Security headers, request logging and CORS for the single-page client
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, ConfigError, StoreBackend};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
