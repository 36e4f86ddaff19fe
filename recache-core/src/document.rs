//! Record representation and cache snapshot serialization.
//!
//! Records are open mappings: ordered BSON documents carrying a unique string
//! `_id` assigned at creation and never mutated afterwards. The persistent
//! store is the authoritative owner of every record; the cache holds a
//! disposable JSON snapshot that may be evicted at any time without data loss.
//!
//! Snapshots are serialized as canonical Extended JSON, which is lossless
//! over every BSON type: plain JSON would narrow an `Int64` holding a small
//! value to `Int32` on the way back, making a cache hit disagree with the
//! store. BSON documents form a tree, never a graph, so serialization cannot
//! encounter reference cycles and is total over every record shape.

use bson::Bson;
use uuid::Uuid;

pub use bson::Document;

use crate::diff::DetailedDiff;
use crate::error::{RecordStoreError, RecordStoreResult};

/// The identifier field carried by every record.
pub const ID_FIELD: &str = "_id";

/// Returns the record's string identifier, if present.
pub fn doc_id(record: &Document) -> Option<&str> {
    record.get_str(ID_FIELD).ok()
}

/// Assigns a fresh UUID string identifier if the record does not carry one.
///
/// An existing `_id` is never overwritten.
pub fn ensure_id(record: &mut Document) {
    if doc_id(record).is_none() {
        record.insert(ID_FIELD, Bson::String(Uuid::new_v4().to_string()));
    }
}

/// Serializes a record into the canonical Extended JSON snapshot format
/// stored in the cache.
pub fn serialize_snapshot(record: &Document) -> RecordStoreResult<String> {
    let value = Bson::Document(record.clone()).into_canonical_extjson();
    Ok(serde_json::to_string(&value)?)
}

/// Deserializes a cached Extended JSON snapshot back into a record.
///
/// Fails with [`RecordStoreError::Serialization`](crate::error::RecordStoreError)
/// when the cached payload is malformed; the record access layer treats that
/// as a cache miss and falls back to the store.
pub fn deserialize_snapshot(snapshot: &str) -> RecordStoreResult<Document> {
    let value: serde_json::Value = serde_json::from_str(snapshot)?;
    match Bson::try_from(value)? {
        Bson::Document(record) => Ok(record),
        other => Err(RecordStoreError::Serialization(format!(
            "cache snapshot is not a document: {:?}",
            other.element_type()
        ))),
    }
}

/// A derived description of what a mutation did to a record.
///
/// Ephemeral: attached to the result of create/update for audit consumers,
/// never persisted to the store or the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeLog {
    /// The record was newly created.
    Created,
    /// The record was updated; carries the field-level difference between the
    /// pre- and post-update snapshots.
    Updated(DetailedDiff),
}

/// The result of a create or update operation.
///
/// `change_log` is `Some(ChangeLog::Created)` for creates; for updates it is
/// `Some(ChangeLog::Updated(..))` only when at least one field actually
/// changed value, and `None` when the payload reproduced the existing state
/// exactly. `modified_paths` lists the top-level field names that changed
/// (empty for creates and no-op updates).
#[derive(Debug, Clone, PartialEq)]
pub struct SavedRecord {
    /// The record as persisted by the store.
    pub record: Document,
    /// What changed, for audit consumers.
    pub change_log: Option<ChangeLog>,
    /// Top-level field names whose value was modified by an update.
    pub modified_paths: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn ensure_id_assigns_once() {
        let mut record = doc! { "name": "Alice" };
        ensure_id(&mut record);

        let id = doc_id(&record).expect("id assigned").to_string();
        assert!(!id.is_empty());

        ensure_id(&mut record);
        assert_eq!(doc_id(&record), Some(id.as_str()));
    }

    #[test]
    fn snapshot_round_trip() {
        let record = doc! {
            "_id": "r1",
            "name": "Alice",
            "tags": ["a", "b"],
            "nested": { "n": 1_i64 },
        };

        let snapshot = serialize_snapshot(&record).unwrap();
        let restored = deserialize_snapshot(&snapshot).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn snapshot_preserves_integer_width() {
        let record = doc! { "_id": "r2", "small": 5_i32, "wide": 1_i64 };

        let restored = deserialize_snapshot(&serialize_snapshot(&record).unwrap()).unwrap();
        assert_eq!(restored.get("small"), Some(&Bson::Int32(5)));
        assert_eq!(restored.get("wide"), Some(&Bson::Int64(1)));
    }

    #[test]
    fn malformed_snapshot_is_a_serialization_error() {
        assert!(deserialize_snapshot("not json").is_err());
        assert!(deserialize_snapshot("[1, 2]").is_err());
    }
}
