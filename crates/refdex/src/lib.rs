//! # Refdex
//!
//! **A local-first bibliographic index and search engine for Zotero
//! libraries.**
//!
//! Refdex mirrors a Zotero installation's `zotero.sqlite` into a
//! private snapshot, denormalizes its items into an in-memory index,
//! and answers free-text and field-qualified queries against it with
//! per-query caching. It never writes to the Zotero database.
//!
//! ## Data Flow
//!
//! 1. A search call checks the live database's modification time; when
//!    it has advanced (or on first use) the file is copied to a private
//!    snapshot and re-indexed ([`library`]).
//! 2. The rebuild sweeps the Zotero schema in passes — general fields,
//!    authors, editors, collections, tags, attachments — producing one
//!    frozen [`Entry`](refdex_core::models::Entry) per admitted item.
//! 3. The query string is parsed into field-qualified terms
//!    ([`refdex_core::query`]) and evaluated against every entry
//!    ([`Entry::matches`](refdex_core::models::Entry::matches)).
//! 4. Matches are cached under the raw query string until the next
//!    rebuild and handed to the caller as shared `Arc<Entry>` values.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | Snapshot copy + read-only SQLite pool |
//! | [`library`] | The index: rebuild passes, freshness, search, caches |
//! | [`error`] | Rebuild error taxonomy |
//! | [`notes_md`] | Markdown note provider for the core's note trait |
//! | [`search`] | `refdex search` command |
//! | [`status`] | `refdex status` / `collections` / `tags` commands |

pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod notes_md;
pub mod search;
pub mod status;

pub use error::LibraryError;
pub use library::Library;
pub use refdex_core::models::Entry;
pub use refdex_core::notes::{Note, NoteProvider};
pub use refdex_core::query::{parse_query, FieldTag, QueryTerm};
