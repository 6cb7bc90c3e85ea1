use exhibit_store::{ExhibitionRecord, Site};
use std::sync::Arc;

/// What a cached lookup is stored under.
///
/// Hostname-only and hostname+path lookups live in the same cache, so the
/// key records which kind of lookup it was. No path, however strange, can
/// produce the key of a hostname-only lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Host(String),
    Path { hostname: String, path: String },
}
impl CacheKey {
    pub fn host(hostname: impl Into<String>) -> Self {
        Self::Host(hostname.into())
    }

    pub fn path(hostname: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Path {
            hostname: hostname.into(),
            path: path.into(),
        }
    }
}

/// A cached lookup result. Values are immutable once inserted and handed out
/// by reference count, so a reader never sees a half-written record.
#[derive(Debug, Clone)]
pub enum Cached {
    Site(Arc<Site>),
    Record(Arc<ExhibitionRecord>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a.com", "*")]
    #[case("a.com", "/*")]
    #[case("a.com", "")]
    #[case("a.com/", "*")]
    fn test_host_and_path_keys_never_collide(#[case] hostname: &str, #[case] path: &str) {
        assert_ne!(CacheKey::host("a.com"), CacheKey::path(hostname, path));
    }

    #[test]
    fn test_path_keys_keep_both_parts() {
        // Naive "hostname + path" concatenation would make these equal.
        assert_ne!(CacheKey::path("a.co", "m/x"), CacheKey::path("a.com", "/x"));
        assert_eq!(CacheKey::path("a.com", "/x"), CacheKey::path("a.com".to_string(), "/x".to_string()));
    }
}
