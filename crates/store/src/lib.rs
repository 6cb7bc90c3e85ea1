//! Exhibition resolution over a versioned content store.
//!
//! An exhibition's content lives in a chain of revisions, each of which
//! records the files (pathname → content hash) it defines. A hostname is
//! bound to an exhibition, and the exhibition points at its head revision.
//! This crate answers two read-only questions against that store:
//!
//! - which exhibition does this hostname belong to ([`Resolve::resolve_host`]);
//! - what is the latest committed version of this path for this hostname
//!   ([`Resolve::resolve_path`]).
//!
//! # Architecture
//! - [`Database`] owns the SQLite connection pool and the schema migrations.
//! - [`Resolver`] checks one connection out of the pool per lookup and runs
//!   a single (recursive, for paths) query.
//! - [`Context`] carries the caller's deadline and cancellation token into
//!   every lookup.

mod context;
mod db;
pub mod error;
mod exhibition;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
mod models;
mod resolver;

pub use crate::context::Context;
pub use crate::db::Database;
pub use crate::exhibition::{ExhibitionRecord, Site};
pub use crate::resolver::{Resolve, Resolver};
use std::sync::Arc;

pub type ResolverHandle = Arc<dyn Resolve>;
