//! Resolve exhibitions from hostnames and paths.
//!
//! This crate wires the pieces together from configuration: the SQLite
//! [`Database`], the [`Resolver`] that walks revision histories in it, and the
//! [`SiteCache`] in front of that. Nothing is global; whoever calls
//! [`Sites::connect()`] owns the result and decides how to share it.
//!
//! ```no_run
//! use exhibit::{Config, Context, Sites};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(None).map_err(|e| format!("{e:?}"))?;
//! let sites = Sites::connect(&config).await.map_err(|e| format!("{e:?}"))?;
//! let ctx = Context::background().with_timeout(Duration::from_millis(500));
//! match sites.get_by_path(&ctx, "example.test", "/index.html").await {
//!     Ok(Some(record)) => println!("serve {}", record.content_hash),
//!     Ok(None) => println!("no such site"),
//!     Err(err) => eprintln!("lookup failed: {err:?}"),
//! }
//! sites.close().await;
//! # Ok(())
//! # }
//! ```

pub use exhibit_cache::{CacheKey, Cached, SiteCache};
pub use exhibit_config::{CacheConfig, Config, DatabaseConfig};
pub use exhibit_store::error::{Error, ErrorKind, Result};
pub use exhibit_store::{Context, Database, ExhibitionRecord, Resolve, Resolver, ResolverHandle, Site};
use std::ops::Deref;
use std::sync::Arc;
use tracing::instrument;

/// A connected database with a resolver and cache in front of it.
///
/// Derefs to [`SiteCache`], so lookups go through the cache.
#[derive(Debug, Clone)]
pub struct Sites {
    database: Database,
    cache: SiteCache,
}

impl Sites {
    /// Open the configured database and put a cache in front of it.
    #[instrument("connecting to exhibition store", skip(config), fields(path = %config.database.path.display()))]
    pub async fn connect(config: &Config) -> Result<Self> {
        let database = Database::connect_with(&config.database).await?;
        Ok(Self::from_database(database, &config.cache))
    }

    /// Build on an already-connected database (e.g. an in-memory one).
    pub fn from_database(database: Database, config: &CacheConfig) -> Self {
        let resolver: ResolverHandle = Arc::new(Resolver::from(&database));
        let cache = SiteCache::with_config(resolver, config);
        Self { database, cache }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Close the connection pool. Cached lookups keep being served until they
    /// expire; anything that needs the database fails with a connection error.
    pub async fn close(&self) {
        self.database.close().await;
    }
}

impl Deref for Sites {
    type Target = SiteCache;
    fn deref(&self) -> &Self::Target {
        &self.cache
    }
}
