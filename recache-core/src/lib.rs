//! A cache-aside access layer over persistent document collections.
//!
//! This crate is the core of the recache project and provides:
//!
//! - **Records and change logs** ([`document`]) - Open-mapping records, cache
//!   snapshot serialization, and the change log attached to mutations
//! - **Resource descriptors and cache keys** ([`key`]) - Per-resource caching
//!   configuration and deterministic key derivation
//! - **Adapter traits** ([`backend`]) - Abstractions over the persistent
//!   store and the key-value cache
//! - **Filter expressions** ([`query`]) - Type-safe filter construction with
//!   a visitor for backend evaluation
//! - **Merge engine** ([`merge`]) - Hard/soft semantics for partial updates
//! - **Diff engine** ([`diff`]) - Field-level change computation for audit
//!   change logs
//! - **Record access layer** ([`records`]) - Cache-aside CRUD coordinating
//!   both adapters
//! - **Pagination** ([`page`]) - List options and results
//! - **Prerequisite validation** ([`prereq`]) - Batched referenced-record
//!   existence checks
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use recache_core::{key::ResourceDescriptor, records::{CreateOptions, RecordAccess}};
//! use bson::doc;
//!
//! let users = RecordAccess::new(
//!     ResourceDescriptor::new("prod", "users"),
//!     store,
//!     cache,
//! );
//!
//! let saved = users
//!     .create(doc! { "name": "Alice" }, CreateOptions::default())
//!     .await?;
//! let fetched = users.read(saved.record.get_str("_id")?).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as recache_core;

pub mod backend;
pub mod diff;
pub mod document;
pub mod error;
pub mod key;
pub mod merge;
pub mod page;
pub mod prereq;
pub mod query;
pub mod records;
