//! Convenient re-exports of commonly used types from recache.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use recache::prelude::*;
//! ```

pub use recache_core::{
    backend::{CacheBackend, DeleteResult, FindOptions, StoreBackend, StoreBackendBuilder},
    diff::{DetailedDiff, detailed_diff, modified_paths},
    document::{ChangeLog, Document, ID_FIELD, SavedRecord, doc_id},
    error::{RecordStoreError, RecordStoreResult},
    key::{CacheKey, CacheWritePolicy, ResourceDescriptor},
    merge::merge,
    page::{DEFAULT_LIMIT, ListOptions, ListResult},
    prereq::{PrereqCheck, verify_prereqs},
    query::{Collation, Expr, FieldOp, Filter, QueryVisitor, SortDirection, SortSpec},
    records::{CreateOptions, RecordAccess, Selector},
};
