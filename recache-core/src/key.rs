//! Resource descriptors and cache key derivation.
//!
//! A [`ResourceDescriptor`] identifies one document collection: a namespace
//! (tenant or environment), a resource (collection) name, and the caching
//! configuration for it. One immutable descriptor is constructed per resource
//! at startup and bound to a [`RecordAccess`](crate::records::RecordAccess)
//! instance; there is no global mutable per-resource state.

/// Policy for cache failures on mutating operations.
///
/// Applied uniformly across create, update, delete, and delete-many. Cache
/// failures on *read* paths always degrade to the store regardless of this
/// policy (a cache miss is a valid, non-error outcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheWritePolicy {
    /// Log the cache failure and continue; the store write stands and the
    /// stale or missing cache entry heals on the next read. Prioritizes
    /// availability over immediate cache freshness.
    #[default]
    LogAndContinue,
    /// Propagate the cache failure to the caller after the store write.
    Propagate,
}

/// Identifies a document collection and its caching configuration.
///
/// Immutable once the record access layer is initialized for a resource.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    namespace: String,
    resource: String,
    cache_enabled: bool,
    cache_write_policy: CacheWritePolicy,
}

impl ResourceDescriptor {
    /// Creates a descriptor with caching enabled and the default
    /// [`CacheWritePolicy`].
    pub fn new(namespace: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            resource: resource.into(),
            cache_enabled: true,
            cache_write_policy: CacheWritePolicy::default(),
        }
    }

    /// Sets whether caching is enabled for this resource.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Sets the policy for cache failures on mutating operations.
    pub fn with_write_policy(mut self, policy: CacheWritePolicy) -> Self {
        self.cache_write_policy = policy;
        self
    }

    /// The tenant/environment namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The collection name.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Whether caching is enabled for this resource.
    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// The policy for cache failures on mutating operations.
    pub fn cache_write_policy(&self) -> CacheWritePolicy {
        self.cache_write_policy
    }

    /// Derives the cache key for a record of this resource.
    pub fn key_for(&self, id: &str) -> String {
        CacheKey::build(&self.namespace, &self.resource, id)
    }
}

/// Deterministic cache key derivation.
pub struct CacheKey;

impl CacheKey {
    /// Builds the cache key `"{namespace}:{resource}:{id}"`.
    ///
    /// Pure and infallible; a malformed id is embedded as given.
    pub fn build(namespace: &str, resource: &str, id: &str) -> String {
        format!("{namespace}:{resource}:{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_format() {
        assert_eq!(CacheKey::build("prod", "users", "abc123"), "prod:users:abc123");
    }

    #[test]
    fn descriptor_key_matches_builder() {
        let descriptor = ResourceDescriptor::new("staging", "orders");
        assert_eq!(descriptor.key_for("o-1"), "staging:orders:o-1");
        assert!(descriptor.cache_enabled());
        assert_eq!(descriptor.cache_write_policy(), CacheWritePolicy::LogAndContinue);
    }

    #[test]
    fn descriptor_overrides() {
        let descriptor = ResourceDescriptor::new("prod", "audit")
            .with_cache(false)
            .with_write_policy(CacheWritePolicy::Propagate);

        assert!(!descriptor.cache_enabled());
        assert_eq!(descriptor.cache_write_policy(), CacheWritePolicy::Propagate);
    }
}
