//! The record access layer: cache-aside CRUD over one resource.
//!
//! [`RecordAccess`] exposes create/read/update/delete/delete-many/list/exists
//! operations coordinating a [`StoreBackend`] (the source of truth) and a
//! [`CacheBackend`] (a performance shadow), bound to one immutable
//! [`ResourceDescriptor`].
//!
//! Every mutating operation writes to the store first, then updates or
//! invalidates the cache; every id read checks the cache first and falls back
//! to the store, repopulating the cache on miss. Whenever both services hold
//! an entry for the same record id, they agree after any operation completes.
//!
//! # Concurrency
//!
//! The layer holds no shared mutable state and takes no locks. Concurrent
//! operations against the same record id are not serialized: two concurrent
//! updates both read the same current snapshot, merge independently, and the
//! later store write wins, silently discarding the earlier merge's effect.
//! Callers requiring strict consistency must serialize above this layer
//! (e.g. per-id queuing).
//!
//! Cache-store consistency holds per individual operation, not across
//! operations: between a store write and the corresponding cache write or
//! delete there is a window in which a concurrent read can observe the old
//! cached value. This is a deliberate eventual-consistency tradeoff for
//! throughput, not a bug. Similarly, `delete_many` collects ids before
//! deleting; a record inserted between those steps escapes cache
//! invalidation.

use tracing::{debug, warn};

use crate::{
    backend::{CacheBackend, FindOptions, StoreBackend},
    diff::{detailed_diff, modified_paths},
    document::{ChangeLog, Document, ID_FIELD, SavedRecord, deserialize_snapshot, doc_id, ensure_id, serialize_snapshot},
    error::{RecordStoreError, RecordStoreResult},
    key::{CacheWritePolicy, ResourceDescriptor},
    merge::merge,
    page::{ListOptions, ListResult},
    query::{Collation, Expr, Filter},
};

/// Target of a read or delete: either a record id or a structured filter.
///
/// Filters bypass the cache entirely; they are not addressable by a single
/// cache key.
#[derive(Debug, Clone)]
pub enum Selector {
    /// A record id, resolved as `_id == id` against the store and as a cache
    /// key against the cache.
    Id(String),
    /// A structured filter, used as-is against the store only.
    Where(Expr),
}

impl From<&str> for Selector {
    fn from(id: &str) -> Self {
        Selector::Id(id.to_string())
    }
}

impl From<String> for Selector {
    fn from(id: String) -> Self {
        Selector::Id(id)
    }
}

impl From<Expr> for Selector {
    fn from(filter: Expr) -> Self {
        Selector::Where(filter)
    }
}

/// Per-call options for [`RecordAccess::create`].
#[derive(Debug, Clone, Copy)]
pub struct CreateOptions {
    /// Whether to populate the cache with the created record. Populating is
    /// best-effort acceleration; the read path always falls back to the store.
    pub cache_enabled: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        CreateOptions { cache_enabled: true }
    }
}

/// Cache-aside CRUD operations over one resource.
///
/// Constructed once per resource with an immutable descriptor and the two
/// adapters. All operations are independently invocable.
#[derive(Debug)]
pub struct RecordAccess<S: StoreBackend, C: CacheBackend> {
    descriptor: ResourceDescriptor,
    store: S,
    cache: C,
}

impl<S: StoreBackend, C: CacheBackend> RecordAccess<S, C> {
    /// Binds a record access layer to a resource descriptor and its adapters.
    pub fn new(descriptor: ResourceDescriptor, store: S, cache: C) -> Self {
        Self { descriptor, store, cache }
    }

    /// The descriptor this layer is bound to.
    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    /// Creates a new record from `data` and persists it.
    ///
    /// Assigns a fresh `_id` when the data carries none. When caching is
    /// enabled for the resource and for this call, the saved record is
    /// serialized and written to the cache under its key.
    ///
    /// Returns the saved record with a change log marking it as created.
    ///
    /// # Errors
    ///
    /// Fails with [`RecordStoreError::Persistence`] if the store rejects the
    /// write; cache failures follow the descriptor's [`CacheWritePolicy`].
    pub async fn create(
        &self,
        data: Document,
        options: CreateOptions,
    ) -> RecordStoreResult<SavedRecord> {
        let mut record = data;
        ensure_id(&mut record);

        let saved = self.store.save(record).await?;

        if self.descriptor.cache_enabled() && options.cache_enabled {
            self.cache_write(&saved).await?;
        }

        Ok(SavedRecord {
            record: saved,
            change_log: Some(ChangeLog::Created),
            modified_paths: Vec::new(),
        })
    }

    /// Reads a record by id or filter.
    ///
    /// An empty id returns `None` immediately. Filter selectors query the
    /// store directly. Id selectors check the cache first when caching is
    /// enabled; on a hit the cached snapshot is returned, on a miss the store
    /// is queried and the cache repopulated best-effort.
    ///
    /// A read never fails due to cache unavailability alone: cache errors and
    /// malformed snapshots degrade to a store read.
    pub async fn read(&self, selector: impl Into<Selector>) -> RecordStoreResult<Option<Document>> {
        let id = match selector.into() {
            Selector::Where(filter) => return self.store.find_one(&filter).await,
            Selector::Id(id) => id,
        };

        if id.is_empty() {
            return Ok(None);
        }

        if self.descriptor.cache_enabled() {
            if let Some(record) = self.cache_read(&id).await {
                return Ok(Some(record));
            }
        }

        let found = self
            .store
            .find_one(&Filter::eq(ID_FIELD, id.as_str()))
            .await?;
        let Some(record) = found else {
            return Ok(None);
        };

        if self.descriptor.cache_enabled() {
            self.cache_repopulate(&record).await;
        }

        Ok(Some(record))
    }

    /// Applies a partial update to the first record matching `query`.
    ///
    /// Returns `None` without touching anything when no record matches. The
    /// post-update state is computed by the merge engine (`hard` selects
    /// array-overwrite over array-append semantics), persisted, and written
    /// to the cache; update always repopulates the entry rather than
    /// invalidating it, since the fresh value is already known.
    ///
    /// The result carries a change log and the modified top-level field names
    /// only when at least one field actually changed value.
    pub async fn update(
        &self,
        query: &Expr,
        payload: &Document,
        hard: bool,
    ) -> RecordStoreResult<Option<SavedRecord>> {
        let Some(current) = self.store.find_one(query).await? else {
            return Ok(None);
        };

        let merged = merge(&current, payload, hard);
        let modified = modified_paths(&current, &merged);

        let saved = self.store.save(merged).await?;

        if self.descriptor.cache_enabled() {
            self.cache_write(&saved).await?;
        }

        let (change_log, modified_paths) = if modified.is_empty() {
            (None, Vec::new())
        } else {
            (Some(ChangeLog::Updated(detailed_diff(&current, &saved))), modified)
        };

        Ok(Some(SavedRecord { record: saved, change_log, modified_paths }))
    }

    /// Deletes the record matching the selector.
    ///
    /// Returns `None` when no record matches (a no-op, not an error) and
    /// `Some(true)` on success. The cache entry is invalidated, not
    /// repopulated; the record no longer exists.
    pub async fn delete(&self, selector: impl Into<Selector>) -> RecordStoreResult<Option<bool>> {
        let filter = match selector.into() {
            Selector::Id(id) => Filter::eq(ID_FIELD, id),
            Selector::Where(filter) => filter,
        };

        let Some(record) = self.store.find_one(&filter).await? else {
            return Ok(None);
        };

        // Delete the record that was loaded, not merely one matching the filter.
        let id = doc_id(&record).map(str::to_string);
        let delete_filter = match &id {
            Some(id) => Filter::eq(ID_FIELD, id.as_str()),
            None => filter,
        };
        self.store.delete_one(&delete_filter).await?;

        if self.descriptor.cache_enabled() {
            if let Some(id) = &id {
                let key = self.descriptor.key_for(id);
                if let Err(err) = self.cache.del(&key).await {
                    self.absorb_cache_error(err, "del")?;
                }
            }
        }

        Ok(Some(true))
    }

    /// Deletes every record matching `query`.
    ///
    /// When caching is enabled, the ids of all matching records are collected
    /// *before* the delete (a projection-only read; after deletion they are
    /// unrecoverable), and their cache keys are removed in a single pipelined
    /// round trip once the store reports at least one deletion.
    ///
    /// Always returns `true`, even when zero records matched: the operation
    /// is idempotent by design.
    pub async fn delete_many(&self, query: &Expr) -> RecordStoreResult<bool> {
        let mut keys = Vec::new();

        if self.descriptor.cache_enabled() {
            let stubs = self
                .store
                .find(query, FindOptions::new().select([ID_FIELD]))
                .await?;
            keys = stubs
                .iter()
                .filter_map(doc_id)
                .map(|id| self.descriptor.key_for(id))
                .collect();
        }

        let result = self.store.delete_many(query).await?;

        if self.descriptor.cache_enabled() && result.deleted_count > 0 && !keys.is_empty() {
            if let Err(err) = self.cache.del_many(&keys).await {
                self.absorb_cache_error(err, "del_many")?;
            }
        }

        Ok(true)
    }

    /// Lists records matching `filter` for one page.
    ///
    /// Never touches the cache; list results are filter-dependent and not
    /// addressable by a single record key. Collation is applied only when a
    /// sort is requested. `has_near` selects the legacy counting path for
    /// proximity-filtered queries, a documented limitation of MongoDB-style
    /// query planners; the flag stays caller-supplied rather than being
    /// inferred from the filter.
    pub async fn list(
        &self,
        filter: &Expr,
        options: ListOptions,
        has_near: bool,
    ) -> RecordStoreResult<ListResult> {
        let page = options.page_or_default();
        let limit = options.limit_or_default();

        let mut find = FindOptions::new().limit(limit).skip(options.skip());
        if let Some(sort) = options.sort {
            find = find.sort(sort).collation(Collation::default());
        }

        let records = self.store.find(filter, find).await?;

        let count = if has_near {
            self.store.count(filter).await?
        } else {
            self.store.count_documents(filter, None).await?
        };

        Ok(ListResult::new(page, count, limit, records))
    }

    /// Returns whether any record matches `query`, via an at-most-one-match
    /// count against the store. Never touches the cache.
    pub async fn exists(&self, query: &Expr) -> RecordStoreResult<bool> {
        Ok(self.store.count_documents(query, Some(1)).await? > 0)
    }

    /// Reads a record snapshot from the cache, degrading every failure to a
    /// miss.
    async fn cache_read(&self, id: &str) -> Option<Document> {
        let key = self.descriptor.key_for(id);

        let snapshot = match self.cache.get(&key).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!(resource = %self.descriptor.resource(), %id, "cache miss");
                return None;
            }
            Err(err) => {
                warn!(
                    resource = %self.descriptor.resource(),
                    %id,
                    error = %err,
                    "cache read failed; falling back to store"
                );
                return None;
            }
        };

        match deserialize_snapshot(&snapshot) {
            Ok(record) => {
                debug!(resource = %self.descriptor.resource(), %id, "cache hit");
                Some(record)
            }
            Err(err) => {
                warn!(
                    resource = %self.descriptor.resource(),
                    %id,
                    error = %err,
                    "malformed cache snapshot; falling back to store"
                );
                None
            }
        }
    }

    /// Writes a record snapshot to the cache on a mutating path, honoring the
    /// descriptor's write policy.
    async fn cache_write(&self, record: &Document) -> RecordStoreResult<()> {
        let Some(id) = doc_id(record) else {
            return Ok(());
        };
        let key = self.descriptor.key_for(id);
        let snapshot = serialize_snapshot(record)?;

        match self.cache.set(&key, &snapshot).await {
            Ok(()) => Ok(()),
            Err(err) => self.absorb_cache_error(err, "set"),
        }
    }

    /// Repopulates the cache after a store read. Always best-effort: read
    /// paths never fail on cache errors, whatever the write policy says.
    async fn cache_repopulate(&self, record: &Document) {
        let Some(id) = doc_id(record) else {
            return;
        };
        let key = self.descriptor.key_for(id);

        let snapshot = match serialize_snapshot(record) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(resource = %self.descriptor.resource(), %id, error = %err, "snapshot serialization failed");
                return;
            }
        };

        if let Err(err) = self.cache.set(&key, &snapshot).await {
            warn!(
                resource = %self.descriptor.resource(),
                %id,
                error = %err,
                "cache repopulation failed"
            );
        }
    }

    /// Applies the descriptor's write policy to a cache failure on a mutating
    /// path.
    fn absorb_cache_error(&self, err: RecordStoreError, op: &str) -> RecordStoreResult<()> {
        match self.descriptor.cache_write_policy() {
            CacheWritePolicy::Propagate => Err(err),
            CacheWritePolicy::LogAndContinue => {
                warn!(
                    resource = %self.descriptor.resource(),
                    %op,
                    error = %err,
                    "cache write degraded"
                );
                Ok(())
            }
        }
    }
}
