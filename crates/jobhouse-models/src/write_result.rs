//! Acknowledgements returned by write endpoints.
//!
//! The single-page client reads `insertedId`, `matchedCount`,
//! `modifiedCount` and `deletedCount`, so the field names are fixed.

use serde::{Deserialize, Serialize};

/// Result of inserting one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl InsertResult {
    pub fn new(inserted_id: impl Into<String>) -> Self {
        Self {
            acknowledged: true,
            inserted_id: inserted_id.into(),
        }
    }
}

/// Result of updating (replacing or incrementing) one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateResult {
    /// A single-document update that either matched and applied, or found nothing.
    pub fn single(matched: bool) -> Self {
        let count = u64::from(matched);
        Self {
            acknowledged: true,
            matched_count: count,
            modified_count: count,
        }
    }
}

/// Result of deleting one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn single(deleted: bool) -> Self {
        Self {
            acknowledged: true,
            deleted_count: u64::from(deleted),
        }
    }
}
