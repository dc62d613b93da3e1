//! Customer review model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A customer review. Reviews carry no schema beyond their identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}
