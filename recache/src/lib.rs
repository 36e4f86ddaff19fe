//! Main recache crate providing a cache-aside access layer for persistent
//! document collections.
//!
//! This crate is the primary entry point for users of the recache framework.
//! It re-exports the core types from the sub-crates and provides convenient
//! access to the in-memory backends.
//!
//! # Features
//!
//! - **Cache-aside reads** - Id reads check the cache first, fall back to the
//!   authoritative store on miss, and repopulate the cache
//! - **Consistent mutations** - Every mutation writes to the store first and
//!   then refreshes or invalidates the cache, so both never disagree after an
//!   operation completes
//! - **Soft and hard updates** - Partial updates with array-append-and-dedup
//!   semantics, or wholesale overwrite
//! - **Audit change logs** - Create/update results carry the field-level
//!   difference between the pre- and post-update snapshots
//! - **Pluggable adapters** - Store and cache behind async traits
//!
//! # Quick Start
//!
//! ```ignore
//! use recache::prelude::*;
//! use recache::memory::{InMemoryCache, InMemoryStore};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let users = RecordAccess::new(
//!         ResourceDescriptor::new("prod", "users"),
//!         InMemoryStore::new(),
//!         InMemoryCache::new(),
//!     );
//!
//!     // Create populates the cache alongside the store.
//!     let saved = users
//!         .create(doc! { "name": "Alice", "tags": ["admin"] }, CreateOptions::default())
//!         .await
//!         .unwrap();
//!     let id = saved.record.get_str("_id").unwrap().to_string();
//!
//!     // Soft update: array fields append with duplicate suppression.
//!     users
//!         .update(&Filter::eq("_id", id.as_str()), &doc! { "tags": ["ops"] }, false)
//!         .await
//!         .unwrap();
//!
//!     // Reads by id are served from the cache when possible.
//!     let fetched = users.read(id.as_str()).await.unwrap().unwrap();
//!     assert_eq!(fetched.get_array("tags").unwrap().len(), 2);
//! }
//! ```
//!
//! # Consistency model
//!
//! The store is the source of truth; the cache is a disposable performance
//! shadow. Consistency between them is maintained per individual operation.
//! There is a window between a store write and the corresponding cache
//! refresh during which a concurrent read can observe the old cached value;
//! and concurrent updates to the same record are not serialized, so the later
//! store write wins. Callers needing stricter guarantees must serialize
//! per-record above this layer. See
//! [`records`](recache_core::records) for the full discussion.

pub mod prelude;

pub use recache_core::{backend, diff, document, error, key, merge, page, prereq, query, records};

// Re-export BSON types for convenience
pub use bson;

/// In-memory backend implementations.
pub mod memory {
    pub use recache_memory::{InMemoryCache, InMemoryStore, InMemoryStoreBuilder};
}
