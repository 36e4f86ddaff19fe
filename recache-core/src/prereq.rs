//! Prerequisite reference validation.
//!
//! Payloads frequently reference related records by id (e.g. an order
//! carrying a `customer` field holding a customer record id). Before
//! accepting such a payload, every referenced record should exist.
//!
//! [`verify_prereqs`] checks the whole batch and collects a field-level
//! message for each missing reference, failing once with
//! [`RecordStoreError::PrerequisiteMissing`] instead of failing fast on the
//! first absent record.

use crate::{
    backend::{CacheBackend, StoreBackend},
    document::{Document, ID_FIELD},
    error::{RecordStoreError, RecordStoreResult},
    query::Filter,
    records::RecordAccess,
};

/// One prerequisite: a payload field holding a record id that must exist in
/// the given resource.
#[derive(Debug)]
pub struct PrereqCheck<'a, S: StoreBackend, C: CacheBackend> {
    /// The payload field carrying the referenced id.
    pub field: &'a str,
    /// The record access layer for the referenced resource.
    pub records: &'a RecordAccess<S, C>,
}

impl<'a, S: StoreBackend, C: CacheBackend> PrereqCheck<'a, S, C> {
    /// Pairs a payload field with the resource it references.
    pub fn new(field: &'a str, records: &'a RecordAccess<S, C>) -> Self {
        Self { field, records }
    }
}

/// Verifies that every referenced record in `payload` exists.
///
/// Fields absent from the payload (or holding an empty id) are skipped, so
/// optional references validate only when supplied. All failures are
/// collected before returning.
///
/// # Errors
///
/// Fails with [`RecordStoreError::PrerequisiteMissing`] carrying one message
/// per missing reference, or propagates store errors from the existence
/// checks.
pub async fn verify_prereqs<S: StoreBackend, C: CacheBackend>(
    payload: &Document,
    checks: &[PrereqCheck<'_, S, C>],
) -> RecordStoreResult<()> {
    let mut missing = Vec::new();

    for check in checks {
        let Ok(id) = payload.get_str(check.field) else {
            continue;
        };
        if id.is_empty() {
            continue;
        }

        if !check.records.exists(&Filter::eq(ID_FIELD, id)).await? {
            missing.push(format!("{} '{}' does not exist.", check.field, id));
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(RecordStoreError::PrerequisiteMissing(missing))
    }
}
