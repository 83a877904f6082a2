//! # Refdex Core
//!
//! Shared, I/O-free logic for Refdex: the bibliographic entry model,
//! search-query parsing, term matching, and the note-provider trait.
//!
//! This crate contains no tokio, sqlx, or filesystem access. Everything
//! that touches the Zotero database or the disk lives in the `refdex`
//! shell crate; this crate only defines the data that flows out of a
//! rebuild and the pure functions that answer queries against it.

pub mod format;
pub mod models;
pub mod notes;
pub mod query;
