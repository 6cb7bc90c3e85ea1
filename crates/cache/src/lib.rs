//! Read-through cache in front of the exhibition resolver.
//!
//! Lookups are answered from memory when possible and from the resolver
//! otherwise. Successful answers are kept for the configured time-to-live, so
//! a cached answer can be at most one TTL behind the store. "Not found" and
//! errors are never cached: a freshly registered host is visible on the very
//! next lookup, and a transient store failure doesn't stick.
//!
//! There is no single-flight: concurrent misses on the same key each go to
//! the resolver, and the last one to finish wins the cache slot.

mod key;

pub use crate::key::{CacheKey, Cached};
use exhibit_config::CacheConfig;
use exhibit_store::error::Result;
use exhibit_store::{Context, ExhibitionRecord, ResolverHandle, Site};
use moka::future::Cache;
use std::sync::Arc;
use tracing::debug;

/// Caching front for a [`Resolve`](exhibit_store::Resolve) implementation.
///
/// Cheap to clone; clones share the same cache and resolver.
#[derive(Clone)]
pub struct SiteCache {
    resolver: ResolverHandle,
    cache: Cache<CacheKey, Cached>,
    cache_host_lookups: bool,
}

impl std::fmt::Debug for SiteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteCache")
            .field("entries", &self.cache.entry_count())
            .field("cache_host_lookups", &self.cache_host_lookups)
            .finish_non_exhaustive()
    }
}

impl SiteCache {
    /// Put `cache` in front of `resolver`.
    ///
    /// The cache's own expiration policy is the default expiration for every
    /// entry; see [`SiteCache::build_cache()`] for one built from configuration.
    pub fn new(resolver: ResolverHandle, cache: Cache<CacheKey, Cached>) -> Self {
        Self {
            resolver,
            cache,
            cache_host_lookups: true,
        }
    }

    pub fn with_config(resolver: ResolverHandle, config: &CacheConfig) -> Self {
        Self::new(resolver, Self::build_cache(config)).cache_host_lookups(config.cache_host_lookups)
    }

    /// Build an empty cache with the configured TTL and capacity.
    pub fn build_cache(config: &CacheConfig) -> Cache<CacheKey, Cached> {
        Cache::builder()
            .name("exhibit")
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl())
            .build()
    }

    /// Whether successful hostname-only lookups are cached too. When
    /// disabled, every [`get_by_host()`](Self::get_by_host) miss goes to the
    /// resolver.
    pub fn cache_host_lookups(mut self, enabled: bool) -> Self {
        self.cache_host_lookups = enabled;
        self
    }

    /// Look up the exhibition bound to `hostname`.
    pub async fn get_by_host(&self, ctx: &Context, hostname: &str) -> Result<Option<Arc<Site>>> {
        let key = CacheKey::host(hostname);
        if let Some(Cached::Site(site)) = self.cache.get(&key).await {
            debug!(hostname, "loaded site from cache");
            return Ok(Some(site));
        }
        debug!(hostname, "loading site from database");
        let Some(site) = self.resolver.resolve_host(ctx, hostname).await? else {
            return Ok(None);
        };
        let site = Arc::new(site);
        if self.cache_host_lookups {
            self.cache.insert(key, Cached::Site(Arc::clone(&site))).await;
        }
        Ok(Some(site))
    }

    /// Look up the latest committed version of `path` for `hostname`.
    pub async fn get_by_path(&self, ctx: &Context, hostname: &str, path: &str) -> Result<Option<Arc<ExhibitionRecord>>> {
        let key = CacheKey::path(hostname, path);
        if let Some(Cached::Record(record)) = self.cache.get(&key).await {
            debug!(hostname, path, "loaded record from cache");
            return Ok(Some(record));
        }
        debug!(hostname, path, "loading record from database");
        let Some(record) = self.resolver.resolve_path(ctx, hostname, path).await? else {
            return Ok(None);
        };
        let record = Arc::new(record);
        self.cache.insert(key, Cached::Record(Arc::clone(&record))).await;
        Ok(Some(record))
    }

    /// Number of cached lookups, after flushing the cache's pending
    /// housekeeping (expirations, evictions).
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Forget every cached lookup. Nothing in here calls this; expiry is
    /// normally left to the TTL.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
