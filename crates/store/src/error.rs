//! Store Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! A lookup that finds nothing is *not* an error: resolvers return `Ok(None)`
//! for that. Everything in here means the lookup could not be answered.

use derive_more::{Display, Error};

/// A store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The query itself failed.
    #[display("database error")]
    Database,
    /// Could not get a usable connection out of the pool (or open the pool).
    #[display("database connection unavailable")]
    Connection,
    #[display("database migration error")]
    Migration,
    /// The caller cancelled the lookup before it completed.
    #[display("lookup cancelled")]
    Cancelled,
    /// The caller's deadline passed before the lookup completed.
    #[display("lookup deadline exceeded")]
    DeadlineExceeded,
    /// A row came back that can't be turned into a model.
    #[display("invalid stored data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection | Self::DeadlineExceeded)
    }

    /// Returns `true` if the lookup was abandoned because of the caller's
    /// [`Context`](crate::Context), rather than because of the store.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
