//! Merge engine for partial record updates.
//!
//! Computes the resulting record state for an update payload against the
//! current record, in one of two modes:
//!
//! - **hard**: every payload field overwrites the current value, arrays
//!   included.
//! - **soft**: fields whose *current* value is an array are merged by
//!   appending the payload's elements, suppressing any element that is deeply
//!   equal to one already present. Existing elements keep their order; new
//!   elements are appended in payload order. Every other field overwrites.
//!
//! Whether a field takes the array-merge path is decided by the current
//! record's type, not the payload's: a payload array arriving for a field
//! that is currently absent or non-array is a plain overwrite. Fields not
//! mentioned in the payload are left untouched. Pure function, no I/O.

use bson::{Bson, Document};

/// Merges `payload` into `current`, returning the post-update record.
pub fn merge(current: &Document, payload: &Document, hard: bool) -> Document {
    let mut merged = current.clone();

    for (key, value) in payload {
        let next = if hard {
            value.clone()
        } else {
            match (current.get(key), value) {
                (Some(Bson::Array(existing)), Bson::Array(incoming)) => {
                    Bson::Array(merge_unique(existing, incoming))
                }
                // A scalar payload against an array field appends as a single element.
                (Some(Bson::Array(existing)), other) => {
                    Bson::Array(merge_unique(existing, std::slice::from_ref(other)))
                }
                _ => value.clone(),
            }
        };

        merged.insert(key.clone(), next);
    }

    merged
}

/// Concatenates two sequences, keeping only the first occurrence of each
/// deeply-equal value.
fn merge_unique(existing: &[Bson], incoming: &[Bson]) -> Vec<Bson> {
    let mut result: Vec<Bson> = Vec::with_capacity(existing.len() + incoming.len());

    for item in existing.iter().chain(incoming) {
        if !result.contains(item) {
            result.push(item.clone());
        }
    }

    result
}
