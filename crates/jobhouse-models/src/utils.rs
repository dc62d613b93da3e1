//! Identifier helpers shared by the store and the API.

use serde_json::{Map, Value};
use thiserror::Error;

/// Field under which a record's identifier is exposed to clients.
pub const ID_FIELD: &str = "_id";

/// Longest identifier the document store accepts, in bytes.
const MAX_ID_BYTES: usize = 1500;

/// Reasons a path-supplied identifier is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentIdError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier exceeds 1500 bytes")]
    TooLong,

    #[error("identifier must not contain '/'")]
    ContainsSlash,

    #[error("identifier '{0}' is reserved")]
    Reserved(String),
}

/// Validate an identifier before it is used to address a document.
pub fn validate_document_id(id: &str) -> Result<(), DocumentIdError> {
    if id.is_empty() {
        return Err(DocumentIdError::Empty);
    }
    if id.len() > MAX_ID_BYTES {
        return Err(DocumentIdError::TooLong);
    }
    if id.contains('/') {
        return Err(DocumentIdError::ContainsSlash);
    }
    if id == "." || id == ".." || (id.len() > 4 && id.starts_with("__") && id.ends_with("__")) {
        return Err(DocumentIdError::Reserved(id.to_string()));
    }
    Ok(())
}

pub(crate) fn strip_id(fields: &mut Map<String, Value>) {
    fields.remove(ID_FIELD);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_generated_ids() {
        assert!(validate_document_id("k3JfP0aQz9LmN2xY7bTc").is_ok());
        assert!(validate_document_id("0f8fad5b-d9cb-469f-a165-70867728950e").is_ok());
    }

    #[test]
    fn test_rejects_malformed_ids() {
        assert_eq!(validate_document_id(""), Err(DocumentIdError::Empty));
        assert_eq!(
            validate_document_id("jobs/abc"),
            Err(DocumentIdError::ContainsSlash)
        );
        assert!(matches!(
            validate_document_id(".."),
            Err(DocumentIdError::Reserved(_))
        ));
        assert!(matches!(
            validate_document_id("__name__"),
            Err(DocumentIdError::Reserved(_))
        ));
        assert_eq!(
            validate_document_id(&"a".repeat(1501)),
            Err(DocumentIdError::TooLong)
        );
    }

    #[test]
    fn test_double_underscore_alone_is_allowed() {
        // "____" has no name between the underscores
        assert!(validate_document_id("____").is_ok());
    }
}
