//! Error types and result types for record store operations.
//!
//! This module provides error handling for all record store operations.
//! Use [`RecordStoreResult<T>`] as the return type for fallible operations.
//!
//! Absence of a record is never an error: read/update/delete signal a missing
//! target with `None` (or `false`), and only genuine failures surface here.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a record store.
///
/// This enum separates failures of the persistent store from failures of the
/// cache, so callers (and the record access layer itself) can apply different
/// policies to each. Cache failures on read paths are absorbed by the layer;
/// cache failures on write paths follow the configured
/// [`CacheWritePolicy`](crate::key::CacheWritePolicy).
#[derive(Error, Debug)]
pub enum RecordStoreError {
    /// Serialization/deserialization error when converting between record formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The persistent store rejected an operation (validation failure,
    /// constraint violation, connectivity loss). Propagated unchanged; the
    /// layer performs no retries.
    #[error("Persistence error: {0}")]
    Persistence(String),
    /// The cache is unreachable or returned malformed data.
    #[error("Cache error: {0}")]
    Cache(String),
    /// The record violates structural constraints (e.g. a non-string `_id`).
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    /// One or more referenced records do not exist. Collected as a batch of
    /// field-level messages rather than failing on the first missing reference.
    #[error("Missing prerequisite record: {}", .0.join(", "))]
    PrerequisiteMissing(Vec<String>),
}

/// A specialized `Result` type for record store operations.
pub type RecordStoreResult<T> = Result<T, RecordStoreError>;

impl From<BsonError> for RecordStoreError {
    fn from(err: BsonError) -> Self {
        RecordStoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for RecordStoreError {
    fn from(err: SerdeJsonError) -> Self {
        RecordStoreError::Serialization(err.to_string())
    }
}
