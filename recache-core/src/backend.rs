//! Adapter traits for the persistent store and the key-value cache.
//!
//! The record access layer coordinates two independently-owned external
//! services: a persistent document store (the source of truth) and a
//! key-value cache (a performance shadow). Both are abstracted behind async
//! traits so the layer stays agnostic of the concrete services.
//!
//! # Traits
//!
//! - [`StoreBackend`]: find/count/save/delete against the persistent
//!   collection backing one resource
//! - [`CacheBackend`]: string-keyed get/set/delete over serialized record
//!   snapshots, including a pipelined multi-key delete
//! - [`StoreBackendBuilder`]: factory trait for constructing store backends
//!
//! Timeouts and retries are the adapters' responsibility; the record access
//! layer propagates adapter failures immediately and never retries.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    document::Document,
    error::RecordStoreResult,
    query::{Collation, Expr, SortSpec},
};

/// Options for a multi-record find against the store.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Restrict returned records to these fields (projection). `None` returns
    /// whole records.
    pub select: Option<Vec<String>>,
    /// Maximum number of records to return.
    pub limit: Option<u64>,
    /// Number of matching records to skip.
    pub skip: Option<u64>,
    /// Sort specification; `None` leaves the store's natural order.
    pub sort: Option<SortSpec>,
    /// Collation for case-/locale-aware sorting.
    pub collation: Option<Collation>,
}

impl FindOptions {
    /// Creates empty options: whole records, natural order, no paging.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts returned records to the given fields.
    pub fn select(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the maximum number of records to return.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the number of matching records to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the sort specification.
    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets the collation for sorted queries.
    pub fn collation(mut self, collation: Collation) -> Self {
        self.collation = Some(collation);
        self
    }
}

/// Outcome of a bulk delete against the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteResult {
    /// Number of records removed.
    pub deleted_count: u64,
}

/// Abstract interface to the persistent collection backing one resource.
///
/// The store is the authoritative owner of every record. Implementations must
/// be thread-safe and support concurrent access from multiple async tasks.
///
/// # Counting paths
///
/// Two counting methods exist because MongoDB-style query planners document
/// that the standard count mechanism is incompatible with proximity
/// (`$near`-style) filters. [`count_documents`](StoreBackend::count_documents)
/// is the standard path and may fail on proximity filters;
/// [`count`](StoreBackend::count) is the legacy path that tolerates them.
/// The record access layer selects between them with a caller-supplied flag.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Finds the first record matching the filter.
    async fn find_one(&self, filter: &Expr) -> RecordStoreResult<Option<Document>>;

    /// Finds records matching the filter, honoring projection, paging, sort,
    /// and collation options.
    async fn find(&self, filter: &Expr, options: FindOptions) -> RecordStoreResult<Vec<Document>>;

    /// Counts matching records through the legacy path, tolerant of proximity
    /// filters.
    async fn count(&self, filter: &Expr) -> RecordStoreResult<u64>;

    /// Counts matching records through the standard path, optionally capped
    /// at `limit` matches.
    ///
    /// # Errors
    ///
    /// May fail with a persistence error when the filter contains a proximity
    /// clause, in stores carrying that query-planner limitation.
    async fn count_documents(&self, filter: &Expr, limit: Option<u64>) -> RecordStoreResult<u64>;

    /// Persists a record, inserting or replacing by `_id`, and returns it as
    /// stored.
    async fn save(&self, record: Document) -> RecordStoreResult<Document>;

    /// Deletes the first record matching the filter. Returns whether a record
    /// was removed.
    async fn delete_one(&self, filter: &Expr) -> RecordStoreResult<bool>;

    /// Deletes every record matching the filter.
    async fn delete_many(&self, filter: &Expr) -> RecordStoreResult<DeleteResult>;
}

#[async_trait]
impl<S> StoreBackend for &S
where
    S: StoreBackend,
{
    async fn find_one(&self, filter: &Expr) -> RecordStoreResult<Option<Document>> {
        (*self).find_one(filter).await
    }

    async fn find(&self, filter: &Expr, options: FindOptions) -> RecordStoreResult<Vec<Document>> {
        (*self).find(filter, options).await
    }

    async fn count(&self, filter: &Expr) -> RecordStoreResult<u64> {
        (*self).count(filter).await
    }

    async fn count_documents(&self, filter: &Expr, limit: Option<u64>) -> RecordStoreResult<u64> {
        (*self)
            .count_documents(filter, limit)
            .await
    }

    async fn save(&self, record: Document) -> RecordStoreResult<Document> {
        (*self).save(record).await
    }

    async fn delete_one(&self, filter: &Expr) -> RecordStoreResult<bool> {
        (*self).delete_one(filter).await
    }

    async fn delete_many(&self, filter: &Expr) -> RecordStoreResult<DeleteResult> {
        (*self).delete_many(filter).await
    }
}

/// Abstract interface to a string-keyed cache holding serialized record
/// snapshots.
///
/// The cache is a disposable shadow of the store: entries may be evicted or
/// invalidated at any time without data loss, and a miss is always a valid,
/// non-error outcome.
#[async_trait]
pub trait CacheBackend: Send + Sync + Debug {
    /// Fetches the snapshot stored under `key`, if any.
    async fn get(&self, key: &str) -> RecordStoreResult<Option<String>>;

    /// Stores a snapshot under `key`, replacing any existing entry.
    async fn set(&self, key: &str, value: &str) -> RecordStoreResult<()>;

    /// Removes the entry under `key`. Removing an absent key is not an error.
    async fn del(&self, key: &str) -> RecordStoreResult<()>;

    /// Removes all given keys in a single round trip (pipelined).
    async fn del_many(&self, keys: &[String]) -> RecordStoreResult<()>;
}

#[async_trait]
impl<C> CacheBackend for &C
where
    C: CacheBackend,
{
    async fn get(&self, key: &str) -> RecordStoreResult<Option<String>> {
        (*self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> RecordStoreResult<()> {
        (*self).set(key, value).await
    }

    async fn del(&self, key: &str) -> RecordStoreResult<()> {
        (*self).del(key).await
    }

    async fn del_many(&self, keys: &[String]) -> RecordStoreResult<()> {
        (*self).del_many(keys).await
    }
}

/// Factory trait for constructing store backends.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> RecordStoreResult<Self::Backend>;
}
