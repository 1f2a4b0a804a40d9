//! Core data models for the photo search service.
//!
//! These entities represent the indexed photo document, the storage
//! notification that triggers ingestion, and the wire shapes of the two
//! external JSON contracts (intent recognition and index search). They
//! serialize naturally as JSON via `serde`.

pub mod document;
pub mod event;
pub mod intent;
pub mod search;
