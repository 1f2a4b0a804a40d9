//! Storage-creation notification consumed by the ingestion handler.
//!
//! Mirrors the S3 event notification JSON: `{Records:[{s3:{bucket:{name},
//! object:{key}}}]}`. Object keys arrive percent-encoded with `+` standing
//! for space.

use serde::Deserialize;

/// Top-level notification envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StorageRecord>,
}

/// One record of the notification; only the `s3` entity is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectRef {
    /// Percent-encoded object key, `+` for space.
    pub key: String,
}
