//! Store error types.

use jobhouse_models::DocumentIdError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid document id: {0}")]
    InvalidId(#[from] DocumentIdError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed document {id}: {reason}")]
    Malformed { id: String, reason: String },

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn malformed(id: impl Into<String>, reason: impl ToString) -> Self {
        Self::Malformed {
            id: id.into(),
            reason: reason.to_string(),
        }
    }
}
