//! src/services/ingest_service.rs
//!
//! IngestService — derives the label set for a newly stored image and
//! writes its search document. Label detection and metadata reads return
//! their own `Result`s so the handler can degrade each step independently;
//! only the index write is allowed to fail the invocation.

use crate::models::document::PhotoDocument;
use crate::services::index_client::{IndexClient, IndexError};
use aws_sdk_rekognition::operation::detect_labels::DetectLabelsError;
use aws_sdk_rekognition::types::{Image, S3Object};
use aws_sdk_s3::operation::head_object::HeadObjectError;
use chrono::Utc;
use percent_encoding::percent_decode_str;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

const MAX_LABELS: i32 = 10;
const MIN_CONFIDENCE: f32 = 70.0;

/// Metadata keys probed for user-supplied labels, first non-empty wins.
/// The upstream uploader's spelling is not pinned down, so all observed
/// variants are kept.
const CUSTOM_LABEL_KEYS: [&str; 3] = ["customlabels", "customLabels", "x-amz-meta-customlabels"];

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("label detection failed: {0}")]
    Detect(#[from] aws_sdk_rekognition::error::SdkError<DetectLabelsError>),
    #[error("object metadata read failed: {0}")]
    Metadata(#[from] aws_sdk_s3::error::SdkError<HeadObjectError>),
    #[error(transparent)]
    Index(#[from] IndexError),
}

pub type IngestResult<T> = Result<T, IngestError>;

/// IngestService holds the label detector, the object-store client used
/// for metadata reads, and the index client for document writes. Each
/// invocation is a single pass; there is no shared state between them.
#[derive(Clone)]
pub struct IngestService {
    rekognition: aws_sdk_rekognition::Client,
    s3: aws_sdk_s3::Client,
    index: IndexClient,
}

impl IngestService {
    pub fn new(
        rekognition: aws_sdk_rekognition::Client,
        s3: aws_sdk_s3::Client,
        index: IndexClient,
    ) -> Self {
        Self { rekognition, s3, index }
    }

    /// Detect up to ten labels at >= 70% confidence for the stored object,
    /// lowercased.
    pub async fn detect_labels(&self, bucket: &str, key: &str) -> IngestResult<Vec<String>> {
        let reference = S3Object::builder().bucket(bucket).name(key).build();
        let output = self
            .rekognition
            .detect_labels()
            .image(Image::builder().s3_object(reference).build())
            .max_labels(MAX_LABELS)
            .min_confidence(MIN_CONFIDENCE)
            .send()
            .await?;

        let labels: Vec<String> = output
            .labels()
            .iter()
            .filter_map(|label| label.name())
            .map(|name| name.to_lowercase())
            .collect();
        debug!("detected labels for {}/{}: {:?}", bucket, key, labels);
        Ok(labels)
    }

    /// Read user-supplied labels from the object's metadata, if any.
    pub async fn custom_labels(&self, bucket: &str, key: &str) -> IngestResult<Vec<String>> {
        let output = self.s3.head_object().bucket(bucket).key(key).send().await?;
        let labels = output
            .metadata()
            .map(custom_labels_from_metadata)
            .unwrap_or_default();
        debug!("custom labels for {}/{}: {:?}", bucket, key, labels);
        Ok(labels)
    }

    /// Build the photo document and upsert it at its derived id. This is
    /// the one step whose failure must fail the whole invocation so the
    /// trigger system can retry.
    pub async fn index_photo(
        &self,
        bucket: &str,
        key: &str,
        labels: Vec<String>,
    ) -> IngestResult<PhotoDocument> {
        let document = PhotoDocument {
            object_key: key.to_string(),
            bucket: bucket.to_string(),
            created_timestamp: Utc::now(),
            labels,
        };
        debug!("indexing {}/{} as {}", bucket, key, document.doc_id());
        self.index.put_document(&document).await?;
        Ok(document)
    }
}

/// Decode a percent-encoded object key as it arrives in the notification,
/// with `+` standing for space. Never fails; invalid sequences decode
/// lossily.
pub(crate) fn decode_object_key(raw: &str) -> String {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Merge detected and user-supplied labels, deduplicating while keeping
/// first-seen order.
pub(crate) fn merge_labels(auto: Vec<String>, custom: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    auto.into_iter()
        .chain(custom)
        .filter(|label| seen.insert(label.clone()))
        .collect()
}

fn custom_labels_from_metadata(metadata: &HashMap<String, String>) -> Vec<String> {
    CUSTOM_LABEL_KEYS
        .iter()
        .filter_map(|key| metadata.get(*key))
        .find(|value| !value.is_empty())
        .map(|raw| split_custom_labels(raw))
        .unwrap_or_default()
}

fn split_custom_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|label| label.trim().to_lowercase())
        .filter(|label| !label.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_percent_escapes_and_plus() {
        assert_eq!(decode_object_key("my+album/cat%20pic.jpg"), "my album/cat pic.jpg");
        assert_eq!(decode_object_key("plain.jpg"), "plain.jpg");
    }

    #[test]
    fn merge_keeps_first_seen_order_without_duplicates() {
        let merged = merge_labels(
            vec!["cat".into(), "dog".into()],
            vec!["cat".into(), "pet".into()],
        );
        assert_eq!(merged, vec!["cat", "dog", "pet"]);
    }

    #[test]
    fn merge_of_empty_sides() {
        assert!(merge_labels(vec![], vec![]).is_empty());
        assert_eq!(merge_labels(vec![], vec!["pet".into()]), vec!["pet"]);
    }

    #[test]
    fn splits_trims_and_lowercases_custom_labels() {
        assert_eq!(split_custom_labels(" Cat , PET ,, holiday "), vec!["cat", "pet", "holiday"]);
        assert!(split_custom_labels("  ,").is_empty());
    }

    #[test]
    fn metadata_lookup_tries_key_variants_in_order() {
        let mut metadata = HashMap::new();
        metadata.insert("customlabels".to_string(), String::new());
        metadata.insert("customLabels".to_string(), "Cat, Pet".to_string());
        metadata.insert("x-amz-meta-customlabels".to_string(), "ignored".to_string());
        assert_eq!(custom_labels_from_metadata(&metadata), vec!["cat", "pet"]);

        let mut prefixed = HashMap::new();
        prefixed.insert("x-amz-meta-customlabels".to_string(), "beach".to_string());
        assert_eq!(custom_labels_from_metadata(&prefixed), vec!["beach"]);

        assert!(custom_labels_from_metadata(&HashMap::new()).is_empty());
    }
}
