//! Seeding helpers for tests.
//!
//! The resolver never writes, but tests need exhibitions, hosts, revisions
//! and trees to resolve against. Enable the `fixtures` feature from another
//! crate's dev-dependencies to get at these.

use crate::Database;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::SqlitePool;

/// Inserts rows straight into the schema, one statement per call.
///
/// Revisions reference their exhibition, so seed in this order: exhibition,
/// revisions (parents first), tree entries, then point the exhibition at its
/// head and bind hosts to it.
///
/// # Examples
///
/// ```
/// use exhibit_store::{Context, Database, Resolve, Resolver, fixtures::Seed};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let db = Database::connect_in_memory().await.unwrap();
/// let seed = Seed::new(&db);
/// seed.exhibition("E", "*").await.unwrap();
/// seed.revision("R1", "E", None, 1).await.unwrap();
/// seed.tree("R1", "/index.html", "H1").await.unwrap();
/// seed.head("E", "R1").await.unwrap();
/// seed.host("site.test", "E").await.unwrap();
///
/// let record = Resolver::from(&db)
///     .resolve_path(&Context::background(), "site.test", "/index.html")
///     .await
///     .unwrap();
/// assert_eq!(record.unwrap().content_hash, "H1");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Seed {
    pool: SqlitePool,
}

impl Seed {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }

    async fn execute<'a>(&self, query: sqlx::query::Query<'a, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'a>>) -> Result<()> {
        query.execute(&self.pool).await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    pub async fn exhibition(&self, id: &str, cors: &str) -> Result<()> {
        self.execute(sqlx::query("INSERT INTO exhibition (id, cors) VALUES (?, ?)").bind(id).bind(cors))
            .await
    }

    pub async fn revision(&self, id: &str, exhibition: &str, parent: Option<&str>, commit_time: i64) -> Result<()> {
        self.execute(
            sqlx::query("INSERT INTO revision (id, exhibition, parent, commit_time) VALUES (?, ?, ?, ?)")
                .bind(id)
                .bind(exhibition)
                .bind(parent)
                .bind(commit_time),
        )
        .await
    }

    pub async fn tree(&self, revision: &str, pathname: &str, hash: &str) -> Result<()> {
        self.execute(
            sqlx::query("INSERT INTO tree (revision, pathname, hash) VALUES (?, ?, ?)")
                .bind(revision)
                .bind(pathname)
                .bind(hash),
        )
        .await
    }

    /// Point an exhibition at its head revision.
    pub async fn head(&self, exhibition: &str, revision: &str) -> Result<()> {
        self.execute(sqlx::query("UPDATE exhibition SET revision = ? WHERE id = ?").bind(revision).bind(exhibition))
            .await
    }

    pub async fn host(&self, hostname: &str, exhibition: &str) -> Result<()> {
        self.execute(
            sqlx::query("INSERT INTO exhibition_host (hostname, exhibition) VALUES (?, ?)")
                .bind(hostname)
                .bind(exhibition),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_rows_are_written() {
        let db = Database::connect_in_memory().await.unwrap();
        let seed = Seed::new(&db);
        seed.exhibition("E", "*").await.unwrap();
        seed.revision("R1", "E", None, 1).await.unwrap();
        seed.revision("R2", "E", Some("R1"), 2).await.unwrap();
        seed.tree("R2", "/index.html", "H2").await.unwrap();
        seed.head("E", "R2").await.unwrap();
        seed.host("site.test", "E").await.unwrap();

        let head: (Option<String>,) = sqlx::query_as("SELECT revision FROM exhibition WHERE id = 'E'")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(head.0.as_deref(), Some("R2"));
        let parent: (Option<String>,) = sqlx::query_as("SELECT parent FROM revision WHERE id = 'R2'")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(parent.0.as_deref(), Some("R1"));
        db.close().await;
    }

    #[tokio::test]
    async fn test_constraint_violation_is_a_database_error() {
        let db = Database::connect_in_memory().await.unwrap();
        let seed = Seed::new(&db);
        seed.exhibition("E", "*").await.unwrap();
        let err = seed.exhibition("E", "*").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Database);
        db.close().await;
    }
}
