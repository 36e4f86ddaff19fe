//! In-memory store backend.
//!
//! Records live in an insertion-ordered vector under an async-aware
//! read-write lock, so the store's natural order is insertion order and
//! unsorted list queries are deterministic. Matching is a linear scan through
//! the expression evaluator.

use std::sync::Arc;

use async_trait::async_trait;
use bson::Document;
use mea::rwlock::RwLock;
use uuid::Uuid;

use recache_core::{
    backend::{DeleteResult, FindOptions, StoreBackend, StoreBackendBuilder},
    document::{ID_FIELD, doc_id},
    error::{RecordStoreError, RecordStoreResult},
    query::{Expr, SortDirection, SortSpec},
};

use crate::evaluator::{Comparable, RecordEvaluator};

/// Thread-safe in-memory store backend for one resource's collection.
///
/// Cloneable; clones share the same underlying records. Suitable for
/// development and testing. Queries scan every record, which is fine for
/// small datasets.
///
/// # Proximity counting
///
/// `count_documents` deliberately fails on filters containing a proximity
/// clause, mirroring the documented limitation of MongoDB-style query
/// planners, so callers exercise the same legacy-count fallback they need
/// against a real store. `count` tolerates proximity clauses.
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    records: Arc<RwLock<Vec<Document>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self { records: Arc::new(RwLock::new(Vec::new())) }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder
    }
}

fn project(record: &Document, select: &[String]) -> Document {
    record
        .iter()
        .filter(|(key, _)| select.iter().any(|field| field == key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn sort_records(records: &mut [Document], sort: &SortSpec, case_insensitive: bool) {
    records.sort_by(|a, b| {
        let left = a.get(&sort.field);
        let right = b.get(&sort.field);

        // Collation-aware string comparison when requested.
        let ordering = match (left, right) {
            (Some(bson::Bson::String(l)), Some(bson::Bson::String(r))) if case_insensitive => {
                l.to_lowercase().cmp(&r.to_lowercase())
            }
            _ => {
                let left = left.map(Comparable::from).unwrap_or(Comparable::Null);
                let right = right.map(Comparable::from).unwrap_or(Comparable::Null);
                left.partial_cmp(&right)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }
        };

        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn find_one(&self, filter: &Expr) -> RecordStoreResult<Option<Document>> {
        let records = self.records.read().await;

        Ok(records
            .iter()
            .find(|record| {
                RecordEvaluator::new(record)
                    .evaluate(filter)
                    .unwrap_or(false)
            })
            .cloned())
    }

    async fn find(&self, filter: &Expr, options: FindOptions) -> RecordStoreResult<Vec<Document>> {
        let records = self.records.read().await;
        let mut matched = RecordEvaluator::matching(records.iter(), filter);
        drop(records);

        if let Some(sort) = &options.sort {
            sort_records(&mut matched, sort, options.collation.is_some());
        }

        let mut result: Vec<Document> = matched
            .into_iter()
            .skip(options.skip.unwrap_or(0) as usize)
            .take(options.limit.unwrap_or(u64::MAX) as usize)
            .collect();

        if let Some(select) = &options.select {
            result = result
                .iter()
                .map(|record| project(record, select))
                .collect();
        }

        Ok(result)
    }

    async fn count(&self, filter: &Expr) -> RecordStoreResult<u64> {
        let records = self.records.read().await;

        Ok(records
            .iter()
            .filter(|record| {
                RecordEvaluator::new(record)
                    .evaluate(filter)
                    .unwrap_or(false)
            })
            .count() as u64)
    }

    async fn count_documents(&self, filter: &Expr, limit: Option<u64>) -> RecordStoreResult<u64> {
        if filter.is_near() {
            return Err(RecordStoreError::Persistence(
                "count_documents cannot run over proximity filters; use the legacy count path"
                    .to_string(),
            ));
        }

        let count = self.count(filter).await?;

        Ok(match limit {
            Some(limit) => count.min(limit),
            None => count,
        })
    }

    async fn save(&self, mut record: Document) -> RecordStoreResult<Document> {
        if doc_id(&record).is_none() {
            record.insert(ID_FIELD, Uuid::new_v4().to_string());
        }
        let id = doc_id(&record)
            .map(str::to_string)
            .ok_or_else(|| RecordStoreError::InvalidRecord("_id must be a string".to_string()))?;

        let mut records = self.records.write().await;

        // Replace in place to keep insertion order stable across updates.
        match records
            .iter()
            .position(|existing| doc_id(existing) == Some(id.as_str()))
        {
            Some(position) => records[position] = record.clone(),
            None => records.push(record.clone()),
        }

        Ok(record)
    }

    async fn delete_one(&self, filter: &Expr) -> RecordStoreResult<bool> {
        let mut records = self.records.write().await;

        let position = records.iter().position(|record| {
            RecordEvaluator::new(record)
                .evaluate(filter)
                .unwrap_or(false)
        });

        Ok(match position {
            Some(position) => {
                records.remove(position);
                true
            }
            None => false,
        })
    }

    async fn delete_many(&self, filter: &Expr) -> RecordStoreResult<DeleteResult> {
        let mut records = self.records.write().await;
        let before = records.len();

        records.retain(|record| {
            !RecordEvaluator::new(record)
                .evaluate(filter)
                .unwrap_or(false)
        });

        Ok(DeleteResult { deleted_count: (before - records.len()) as u64 })
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> RecordStoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use recache_core::query::{Collation, Filter};

    #[tokio::test]
    async fn save_assigns_id_and_replaces_in_place() {
        let store = InMemoryStore::new();

        let first = store.save(doc! { "name": "a" }).await.unwrap();
        let second = store.save(doc! { "name": "b" }).await.unwrap();
        assert!(doc_id(&first).is_some());

        // Updating the first record keeps it first.
        let id = doc_id(&first).unwrap().to_string();
        store
            .save(doc! { "_id": id.as_str(), "name": "a2" })
            .await
            .unwrap();

        let all = store
            .find(&Filter::all(), FindOptions::new())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].get_str("name").unwrap(), "a2");
        assert_eq!(all[1], second);
    }

    #[tokio::test]
    async fn find_honors_skip_limit_and_select() {
        let store = InMemoryStore::new();
        for n in 0..5 {
            store
                .save(doc! { "_id": format!("r{n}"), "n": n })
                .await
                .unwrap();
        }

        let page = store
            .find(&Filter::all(), FindOptions::new().skip(2).limit(2))
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].get_str("_id").unwrap(), "r2");

        let stubs = store
            .find(&Filter::all(), FindOptions::new().select([ID_FIELD]))
            .await
            .unwrap();
        assert!(stubs.iter().all(|stub| stub.len() == 1));
    }

    #[tokio::test]
    async fn sorted_find_with_collation_is_case_insensitive() {
        let store = InMemoryStore::new();
        store.save(doc! { "name": "banana" }).await.unwrap();
        store.save(doc! { "name": "Apple" }).await.unwrap();

        let sorted = store
            .find(
                &Filter::all(),
                FindOptions::new()
                    .sort(SortSpec::asc("name"))
                    .collation(Collation::default()),
            )
            .await
            .unwrap();

        assert_eq!(sorted[0].get_str("name").unwrap(), "Apple");
    }

    #[tokio::test]
    async fn count_documents_rejects_proximity_filters() {
        let store = InMemoryStore::new();
        store
            .save(doc! { "location": [1.0, 1.0] })
            .await
            .unwrap();

        let near = Filter::near("location", 0.0, 0.0);
        assert!(store.count_documents(&near, None).await.is_err());
        assert_eq!(store.count(&near).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_many_reports_count() {
        let store = InMemoryStore::new();
        for n in 0..3 {
            store
                .save(doc! { "kind": if n < 2 { "x" } else { "y" } })
                .await
                .unwrap();
        }

        let result = store
            .delete_many(&Filter::eq("kind", "x"))
            .await
            .unwrap();
        assert_eq!(result.deleted_count, 2);

        let again = store
            .delete_many(&Filter::eq("kind", "x"))
            .await
            .unwrap();
        assert_eq!(again.deleted_count, 0);
    }
}
