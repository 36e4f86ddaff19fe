//! In-memory backends for recache.
//!
//! This crate provides thread-safe, in-memory implementations of the
//! `StoreBackend` and `CacheBackend` traits, using async-aware read-write
//! locks for concurrent access. Ideal for development and testing.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Insertion-ordered store** - Natural order is deterministic for unsorted queries
//! - **Full filter support** - Comparison, logical, existence, and proximity clauses
//! - **Faithful counting quirks** - The standard count path rejects proximity
//!   filters the way MongoDB-style stores do, so the legacy-count fallback is
//!   exercisable without a real store
//!
//! # Quick Start
//!
//! ```ignore
//! use recache::{key::ResourceDescriptor, records::{CreateOptions, RecordAccess}};
//! use recache::memory::{InMemoryCache, InMemoryStore};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let users = RecordAccess::new(
//!         ResourceDescriptor::new("dev", "users"),
//!         InMemoryStore::new(),
//!         InMemoryCache::new(),
//!     );
//!
//!     let saved = users
//!         .create(doc! { "name": "Alice" }, CreateOptions::default())
//!         .await
//!         .unwrap();
//!
//!     let id = saved.record.get_str("_id").unwrap();
//!     let fetched = users.read(id).await.unwrap();
//!     assert!(fetched.is_some());
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as recache_memory;

pub mod cache;
pub mod evaluator;
pub mod store;

pub use cache::InMemoryCache;
pub use store::{InMemoryStore, InMemoryStoreBuilder};
