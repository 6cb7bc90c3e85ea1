//! Config Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// One of the configuration sources could not be read or parsed.
    #[display("could not load configuration")]
    Load,
    /// A configuration file was asked for explicitly but isn't there.
    #[display("configuration file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The configuration file has an extension we don't know how to parse.
    #[display("unsupported configuration format: {}", _0.display())]
    UnsupportedFormat(#[error(not(source))] PathBuf),
    /// A value was parsed successfully but makes no sense.
    #[display("invalid configuration value: {_0}")]
    Invalid(#[error(not(source))] &'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Invalid("cache.ttl_secs").to_string(), "invalid configuration value: cache.ttl_secs");
        assert_eq!(
            ErrorKind::UnsupportedFormat(PathBuf::from("exhibit.ini")).to_string(),
            "unsupported configuration format: exhibit.ini"
        );
        assert_eq!(
            ErrorKind::NotFound(PathBuf::from("/etc/exhibit.toml")).to_string(),
            "configuration file not found: /etc/exhibit.toml"
        );
    }
}
