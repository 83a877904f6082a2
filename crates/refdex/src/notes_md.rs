//! Markdown note provider.
//!
//! The shell-side implementation of [`NoteProvider`]: notes live as
//! Markdown files in one directory, named either after the entry's
//! Zotero key (`ABCD2345.md`) or after its filename format
//! (`Smith & Jones (2020).md`). The key form wins when both exist.

use std::path::PathBuf;

use refdex_core::models::Entry;
use refdex_core::notes::{Note, NoteProvider};

pub struct MarkdownNotes {
    root: PathBuf,
}

impl MarkdownNotes {
    pub fn new(root: PathBuf) -> MarkdownNotes {
        MarkdownNotes { root }
    }
}

impl NoteProvider for MarkdownNotes {
    fn lookup(&self, entry: &Entry) -> Option<Note> {
        if let Some(key) = &entry.key {
            let candidate = self.root.join(format!("{key}.md"));
            if candidate.is_file() {
                return Some(Note { path: candidate });
            }
        }
        let candidate = self.root.join(format!("{}.md", entry.filename_format()));
        candidate.is_file().then_some(Note { path: candidate })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry_with_key(key: &str) -> Entry {
        let mut entry = Entry::new(1);
        entry.key = Some(key.to_string());
        entry.authors = vec!["Smith".to_string()];
        entry.date = Some("2020".to_string());
        entry
    }

    #[test]
    fn resolves_by_key() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ABCD2345.md");
        std::fs::write(&path, "# notes").unwrap();

        let provider = MarkdownNotes::new(tmp.path().to_path_buf());
        let entry = entry_with_key("ABCD2345");
        assert_eq!(entry.note(&provider), Some(&Note { path }));
    }

    #[test]
    fn falls_back_to_filename_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Smith (2020).md");
        std::fs::write(&path, "# notes").unwrap();

        let provider = MarkdownNotes::new(tmp.path().to_path_buf());
        let entry = entry_with_key("NOSUCHKEY");
        assert_eq!(entry.note(&provider), Some(&Note { path }));
    }

    #[test]
    fn miss_is_memoized() {
        let tmp = TempDir::new().unwrap();
        let provider = MarkdownNotes::new(tmp.path().to_path_buf());
        let entry = entry_with_key("ABCD2345");

        assert!(entry.note(&provider).is_none());
        // Creating the file afterwards must not change the answer: the
        // miss was resolved and memoized.
        std::fs::write(tmp.path().join("ABCD2345.md"), "# late").unwrap();
        assert!(entry.note(&provider).is_none());
        assert!(entry.note_resolved());
    }
}
