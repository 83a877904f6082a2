//! Note-provider abstraction.
//!
//! Refdex itself never stores or renders notes. The surrounding
//! application supplies a [`NoteProvider`], and each entry resolves its
//! note through it at most once (see [`Entry::note`]).
//!
//! [`Entry::note`]: crate::models::Entry::note

use serde::Serialize;
use std::path::PathBuf;

/// A resolved note associated with an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    /// Location of the note document on disk.
    pub path: PathBuf,
}

/// Capability for looking up the note attached to an entry.
///
/// Implementations own their failure handling: a lookup that errors
/// internally should surface as `None`. The core records only
/// resolved-versus-unresolved state.
pub trait NoteProvider: Send + Sync {
    /// Find the note for `entry`, if one exists.
    fn lookup(&self, entry: &crate::models::Entry) -> Option<Note>;
}
