//! Typed repositories over a `DocumentStore`.

mod applications;
mod jobs;
mod reviews;

pub use applications::JobApplicationRepository;
pub use jobs::JobRepository;
pub use reviews::ReviewRepository;

use serde::de::DeserializeOwned;

use crate::error::StoreResult;
use crate::store::Record;

/// Decode a scan result. Models keep every stored field as is, so nothing
/// is dropped here; a record that fails to decode fails the listing.
fn decode_all<T: DeserializeOwned>(records: Vec<Record>) -> StoreResult<Vec<T>> {
    records.into_iter().map(Record::decode).collect()
}
