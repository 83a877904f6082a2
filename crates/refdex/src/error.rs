//! Error taxonomy for the index rebuild boundary.
//!
//! Rebuild failures fall into two very different buckets: the live
//! database being temporarily unreachable (serve stale data, report
//! "not fresh"), and the snapshot not looking like a Zotero database at
//! all (propagate loudly — stale data must not be served silently
//! forever). [`Library::ensure_fresh`] converts the first into a
//! boolean availability signal and lets the rest surface as errors.
//!
//! [`Library::ensure_fresh`]: crate::library::Library::ensure_fresh

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    /// The live database could not be stat'ed or copied. Transient;
    /// the previous index keeps serving.
    #[error("source database unavailable: {source}")]
    SourceUnavailable {
        #[from]
        source: std::io::Error,
    },

    /// The snapshot violates a Zotero schema assumption, e.g. the
    /// `itemTypes` table has no `attachment` row. Indicates an
    /// incompatible source version, not transient I/O.
    #[error("source schema mismatch: {detail}")]
    SchemaMismatch { detail: String },

    /// A query against our private snapshot copy failed. The snapshot
    /// is not shared with any writer, so this is treated like a schema
    /// mismatch rather than a transient condition.
    #[error("snapshot query failed: {source}")]
    Snapshot {
        #[from]
        source: sqlx::Error,
    },
}
