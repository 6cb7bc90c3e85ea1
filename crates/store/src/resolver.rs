//! Hostname and path resolution against the versioned content store.
//!
//! Revisions form a chain through their `parent` link, and every revision
//! records the tree entries (pathname → content hash) valid at that revision.
//! Resolving a path means walking from the exhibition's head revision back
//! through its ancestors and taking the entry from the most recently committed
//! revision that defines that exact pathname.

use crate::error::{ErrorKind, Result};
use crate::models::{RecordRow, SiteRow};
use crate::{Context, Database, ExhibitionRecord, Site};
use async_trait::async_trait;
use exn::ResultExt;
use sqlx::SqlitePool;
use tracing::instrument;

/// Anything that can turn a hostname (and optionally a path) into an exhibition.
///
/// [`Resolver`] is the real implementation. The trait exists so the cache
/// layer can sit in front of any resolver, including counting stubs in tests.
///
/// `Ok(None)` means "no such site" or "no such file" and is a perfectly good
/// answer; `Err` means the question could not be answered at all.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Look up the exhibition bound to `hostname`, without touching any
    /// revision history.
    async fn resolve_host(&self, ctx: &Context, hostname: &str) -> Result<Option<Site>>;

    /// Find the most recently committed entry for `path` in the revision
    /// history of the exhibition bound to `hostname`.
    ///
    /// `path` is matched exactly: no normalization, no trailing slash
    /// handling, no prefix matching.
    async fn resolve_path(&self, ctx: &Context, hostname: &str, path: &str) -> Result<Option<ExhibitionRecord>>;
}

/// Resolves exhibitions straight from the database.
///
/// Each lookup checks a connection out of the pool, runs exactly one query,
/// and hands the connection back before returning, whatever the outcome.
#[derive(Debug, Clone)]
pub struct Resolver {
    pool: SqlitePool,
}
impl From<&Database> for Resolver {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Resolver {
    /// Resolve against an existing pool, e.g. one shared with the write path.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Resolve for Resolver {
    #[instrument(level = "debug", skip(self, ctx))]
    async fn resolve_host(&self, ctx: &Context, hostname: &str) -> Result<Option<Site>> {
        let row: Option<SiteRow> = ctx
            .run(async {
                let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Connection)?;
                sqlx::query_as::<_, SiteRow>(include_str!("../queries/resolve_host.sql"))
                    .bind(hostname)
                    .fetch_optional(&mut *conn)
                    .await
                    .or_raise(|| ErrorKind::Database)
            })
            .await?;
        Ok(row.map(Site::from))
    }

    #[instrument(level = "debug", skip(self, ctx))]
    async fn resolve_path(&self, ctx: &Context, hostname: &str, path: &str) -> Result<Option<ExhibitionRecord>> {
        let row: Option<RecordRow> = ctx
            .run(async {
                let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Connection)?;
                sqlx::query_as::<_, RecordRow>(include_str!("../queries/resolve_host_path.sql"))
                    .bind(hostname)
                    .bind(path)
                    .fetch_optional(&mut *conn)
                    .await
                    .or_raise(|| ErrorKind::Database)
            })
            .await?;
        row.map(ExhibitionRecord::try_from).transpose()
    }
}
