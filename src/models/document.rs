//! Represents a photo document stored in the search index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single indexed photo record.
///
/// One document exists per distinct object key; re-ingesting the same key
/// fully replaces the document at the derived id. The document carries
/// metadata about the stored image, never the image bytes themselves.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDocument {
    /// Storage object key the document describes.
    pub object_key: String,

    /// Bucket holding the object.
    pub bucket: String,

    /// When the document was indexed (RFC 3339).
    pub created_timestamp: DateTime<Utc>,

    /// Lowercase content labels, detected and user-supplied, deduplicated
    /// in first-seen order.
    pub labels: Vec<String>,
}

impl PhotoDocument {
    /// Index id for this document, derived from the object key with `/`
    /// and spaces replaced by `_`. Deterministic, so re-ingestion lands on
    /// the same document.
    pub fn doc_id(&self) -> String {
        self.object_key.replace(['/', ' '], "_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_replaces_slashes_and_spaces() {
        let doc = PhotoDocument {
            object_key: "a/b c.jpg".into(),
            bucket: "b".into(),
            created_timestamp: Utc::now(),
            labels: vec![],
        };
        assert_eq!(doc.doc_id(), "a_b_c.jpg");
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let doc = PhotoDocument {
            object_key: "x.jpg".into(),
            bucket: "b".into(),
            created_timestamp: Utc::now(),
            labels: vec!["cat".into()],
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("objectKey").is_some());
        assert!(value.get("createdTimestamp").is_some());
        assert_eq!(value["labels"][0], "cat");
    }
}
