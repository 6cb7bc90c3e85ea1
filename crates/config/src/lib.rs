//! Configuration loading and validation.
//!
//! Configuration is layered with `figment`, highest precedence last:
//!
//! 1. Built-in defaults.
//! 2. An optional configuration file (TOML, YAML or JSON, picked by extension).
//! 3. Environment variables prefixed with `EXHIBIT_`, using `__` to reach
//!    nested keys (e.g. `EXHIBIT_CACHE__TTL_SECS=60`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "EXHIBIT_";
const ENV_SEPARATOR: &str = "__";
const DATABASE_FILENAME: &str = "exhibit.sqlite";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
}

/// Where the versioned content store lives, and how many connections to it
/// we're allowed to hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,
    pub max_connections: u32,
    /// How long a lookup may wait for a pooled connection before giving up.
    pub acquire_timeout_ms: u64,
    /// `PRAGMA busy_timeout`, for when the write path holds the lock.
    pub busy_timeout_ms: u64,
    /// Open the database file read-only. Migrations are skipped.
    pub read_only: bool,
}
impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: 5,
            acquire_timeout_ms: 3000,
            busy_timeout_ms: 1500,
            read_only: false,
        }
    }
}
impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Read-through cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Default expiration applied to every cached lookup. This is the upper
    /// bound on how stale a cached record can get.
    pub ttl_secs: u64,
    /// Maximum number of cached lookups before the least useful are evicted.
    pub max_capacity: u64,
    /// Also cache successful hostname-only lookups, not just path lookups.
    pub cache_host_lookups: bool,
}
impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            max_capacity: 10_000,
            cache_host_lookups: true,
        }
    }
}
impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

fn default_database_path() -> PathBuf {
    match ProjectDirs::from("", "", "exhibit") {
        Some(dirs) => dirs.data_dir().join(DATABASE_FILENAME),
        None => PathBuf::from(DATABASE_FILENAME),
    }
}

impl Config {
    /// Load configuration from defaults, an optional file, and the environment.
    ///
    /// A file that was explicitly asked for but doesn't exist is an error,
    /// rather than silently falling back to the defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            tracing::debug!(path = %path.display(), "loading configuration file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
            };
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR));
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse fine but would produce a useless resolver.
    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            exn::bail!(ErrorKind::Invalid("database.max_connections"));
        }
        if self.cache.ttl_secs == 0 {
            exn::bail!(ErrorKind::Invalid("cache.ttl_secs"));
        }
        if self.cache.max_capacity == 0 {
            exn::bail!(ErrorKind::Invalid("cache.max_capacity"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert_eq!(config.database.acquire_timeout(), Duration::from_secs(3));
        assert!(config.cache.cache_host_lookups);
        assert!(config.database.path.ends_with(DATABASE_FILENAME));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = Path::new("/definitely/not/here/exhibit.toml");
        let err = Config::load(Some(path)).unwrap_err();
        assert_eq!(*err, ErrorKind::NotFound(path.to_path_buf()));
    }

    #[test]
    fn test_unsupported_extension() {
        let mut file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        writeln!(file, "ttl_secs = 5").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn test_yaml_file() {
        // Jailed so that environment variables set by other tests can't leak in.
        Jail::expect_with(|jail| {
            jail.create_file("exhibit.yaml", "database:\n  path: /srv/exhibit.sqlite\ncache:\n  ttl_secs: 30\n")?;
            let config = Config::load(Some(Path::new("exhibit.yaml"))).map_err(|e| format!("{e:?}"))?;
            assert_eq!(config.database.path, PathBuf::from("/srv/exhibit.sqlite"));
            assert_eq!(config.cache.ttl_secs, 30);
            // Untouched keys keep their defaults.
            assert_eq!(config.cache.max_capacity, 10_000);
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "exhibit.toml",
                r#"
                    [cache]
                    ttl_secs = 30
                    cache_host_lookups = false
                "#,
            )?;
            jail.set_env("EXHIBIT_CACHE__TTL_SECS", "90");
            jail.set_env("EXHIBIT_DATABASE__MAX_CONNECTIONS", "2");
            let config = Config::load(Some(Path::new("exhibit.toml"))).map_err(|e| format!("{e:?}"))?;
            assert_eq!(config.cache.ttl_secs, 90);
            assert!(!config.cache.cache_host_lookups);
            assert_eq!(config.database.max_connections, 2);
            Ok(())
        });
    }

    #[rstest]
    #[case("EXHIBIT_CACHE__TTL_SECS", "cache.ttl_secs")]
    #[case("EXHIBIT_CACHE__MAX_CAPACITY", "cache.max_capacity")]
    #[case("EXHIBIT_DATABASE__MAX_CONNECTIONS", "database.max_connections")]
    fn test_zero_values_are_rejected(#[case] var: &str, #[case] field: &'static str) {
        Jail::expect_with(|jail| {
            jail.set_env(var, "0");
            let err = Config::load(None).unwrap_err();
            assert_eq!(*err, ErrorKind::Invalid(field));
            Ok(())
        });
    }
}
