//! Errors from the Firestore REST API.

use thiserror::Error;

/// Result type for Firestore operations.
pub type FirestoreResult<T> = Result<T, FirestoreError>;

/// A failed Firestore call, classified by what the caller can do about it.
#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("Firestore authentication failed: {0}")]
    AuthError(String),

    #[error("Firestore document not found: {0}")]
    NotFound(String),

    #[error("Firestore document already exists: {0}")]
    AlreadyExists(String),

    #[error("Firestore permission denied: {0}")]
    PermissionDenied(String),

    #[error("Firestore rejected the request: {0}")]
    RequestFailed(String),

    #[error("Unexpected Firestore response: {0}")]
    InvalidResponse(String),

    #[error("Firestore quota exceeded (retry after {0}ms)")]
    RateLimited(u64),

    #[error("Firestore server error {0}: {1}")]
    ServerError(u16, String),

    #[error("Firestore unreachable: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Firestore payload could not be decoded: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Firestore precondition failed: {0}")]
    PreconditionFailed(String),
}

impl FirestoreError {
    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    /// Classify a non-success HTTP status.
    pub fn from_http_status(status: u16, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        match status {
            401 => Self::AuthError(msg),
            403 => Self::PermissionDenied(msg),
            404 => Self::NotFound(msg),
            409 => Self::AlreadyExists(msg),
            412 => Self::PreconditionFailed(msg),
            429 => Self::RateLimited(0),
            500..=599 => Self::ServerError(status, msg),
            _ => Self::RequestFailed(msg),
        }
    }

    /// HTTP status this error corresponds to, for metrics labels.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            FirestoreError::AuthError(_) => Some(401),
            FirestoreError::PermissionDenied(_) => Some(403),
            FirestoreError::NotFound(_) => Some(404),
            FirestoreError::AlreadyExists(_) => Some(409),
            FirestoreError::PreconditionFailed(_) => Some(412),
            FirestoreError::RateLimited(_) => Some(429),
            FirestoreError::ServerError(status, _) => Some(*status),
            FirestoreError::RequestFailed(_) => Some(400),
            FirestoreError::InvalidResponse(_)
            | FirestoreError::Network(_)
            | FirestoreError::Json(_) => None,
        }
    }

    /// Server-requested delay before retrying, if any.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            FirestoreError::RateLimited(ms) if *ms > 0 => Some(*ms),
            _ => None,
        }
    }

    /// Transient failures: network errors, quota (429) and 5xx.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FirestoreError::Network(_)
                | FirestoreError::RateLimited(_)
                | FirestoreError::ServerError(_, _)
        )
    }

    /// True if the store could not be reached or is overloaded, as opposed
    /// to rejecting the request.
    pub fn is_unavailable(&self) -> bool {
        self.is_retryable() || matches!(self, FirestoreError::AuthError(_))
    }
}
