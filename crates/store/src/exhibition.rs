//! Resolved lookup results.
//!
//! Hostname-only and hostname+path lookups produce differently-shaped
//! results, so they are different types: a [`Site`] never pretends to have a
//! pathname or content hash.

use time::UtcDateTime;

/// The exhibition a hostname is bound to, without resolving any path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Site {
    /// Opaque exhibition identifier.
    pub exhibition: String,
    /// Cross-origin policy to send alongside anything served for this site.
    pub cors: String,
}

/// A single file resolved through an exhibition's revision history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExhibitionRecord {
    /// Opaque exhibition identifier.
    pub exhibition: String,
    /// When the revision that last defined `pathname` was committed.
    pub commit_time: UtcDateTime,
    pub pathname: String,
    /// Key into the content-addressed store holding the file's bytes.
    pub content_hash: String,
    pub cors: String,
}
impl ExhibitionRecord {
    /// The hostname-level part of this record.
    pub fn site(&self) -> Site {
        Site {
            exhibition: self.exhibition.clone(),
            cors: self.cors.clone(),
        }
    }
}
