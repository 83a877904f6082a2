//! The bibliographic entry model and term matching.
//!
//! An [`Entry`] is a denormalized view of one Zotero item, assembled by
//! the shell crate's rebuild passes and published behind an `Arc`.
//! After publication nothing mutates an entry, which is the invariant
//! that makes the memoized display strings and the memoized note
//! association safe without any invalidation.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::notes::{Note, NoteProvider};
use crate::query::{FieldTag, QueryTerm};

/// One bibliographic entry.
///
/// All scalar fields are optional: Zotero items routinely lack a date,
/// a DOI, or even a title. The `date` field holds either a 4-character
/// year string or one of the special literals (`"in press"`,
/// `"submitted"`, `"in preparation"`, `"unpublished"`).
///
/// The struct is constructed and filled in by the index rebuild, then
/// frozen: the formatted-string caches and the note cache memoize
/// without invalidation because a published entry never changes.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    /// Zotero `itemID`, stable across rebuilds.
    pub id: i64,
    /// Zotero stable string key, when the item had a general-fields row.
    pub key: Option<String>,
    pub title: Option<String>,
    /// Publication venue (journal, book, proceedings, blog, ...).
    pub publication: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub doi: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    /// 4-character year or a special date literal.
    pub date: Option<String>,
    /// Author surnames, in the item's creator order.
    pub authors: Vec<String>,
    /// Editor surnames, in the item's creator order.
    pub editors: Vec<String>,
    pub collections: Vec<String>,
    pub tags: Vec<String>,
    /// Resolved full-text attachment paths.
    pub attachments: Vec<PathBuf>,

    #[serde(skip)]
    pub(crate) label_cache: OnceLock<String>,
    #[serde(skip)]
    pub(crate) full_cache: OnceLock<String>,
    #[serde(skip)]
    pub(crate) html_cache: OnceLock<String>,
    #[serde(skip)]
    pub(crate) filename_cache: OnceLock<String>,
    #[serde(skip)]
    note_cache: OnceLock<Option<Note>>,
}

impl Entry {
    /// An empty entry for `id`. Rebuild passes fill the rest in.
    pub fn new(id: i64) -> Entry {
        Entry {
            id,
            key: None,
            title: None,
            publication: None,
            volume: None,
            issue: None,
            doi: None,
            url: None,
            abstract_text: None,
            date: None,
            authors: Vec::new(),
            editors: Vec::new(),
            collections: Vec::new(),
            tags: Vec::new(),
            attachments: Vec::new(),
            label_cache: OnceLock::new(),
            full_cache: OnceLock::new(),
            html_cache: OnceLock::new(),
            filename_cache: OnceLock::new(),
            note_cache: OnceLock::new(),
        }
    }

    /// Evaluate the entry against a parsed term list.
    ///
    /// Conjunctive over all terms. An empty term list matches nothing,
    /// so a query that parsed to garbage never returns the full corpus.
    /// Needles are expected lowercased, as produced by
    /// [`parse_query`](crate::query::parse_query).
    pub fn matches(&self, terms: &[QueryTerm]) -> bool {
        if terms.is_empty() {
            return false;
        }
        terms.iter().all(|term| match term.tag {
            Some(tag) => self.field_matches(tag, &term.needle),
            // Untagged terms search everywhere.
            None => FieldTag::ALL
                .iter()
                .any(|&tag| self.field_matches(tag, &term.needle)),
        })
    }

    /// One field rule: case-insensitive substring containment.
    /// A field the entry does not have never matches.
    fn field_matches(&self, tag: FieldTag, needle: &str) -> bool {
        match tag {
            FieldTag::Tag => contains_any(&self.tags, needle),
            FieldTag::Collection => contains_any(&self.collections, needle),
            FieldTag::Author => contains_any(&self.authors, needle),
            FieldTag::Editor => contains_any(&self.editors, needle),
            FieldTag::Date => contains_opt(&self.date, needle),
            FieldTag::Publication => contains_opt(&self.publication, needle),
            FieldTag::Title => contains_opt(&self.title, needle),
            FieldTag::Doi => contains_opt(&self.doi, needle),
            FieldTag::Abstract => contains_opt(&self.abstract_text, needle),
        }
    }

    /// Resolve the associated note through `provider`, at most once.
    ///
    /// The first call delegates to the provider and memoizes whatever
    /// comes back, including "no note". Later calls return the memo
    /// without touching the provider again.
    pub fn note(&self, provider: &dyn NoteProvider) -> Option<&Note> {
        self.note_cache.get_or_init(|| provider.lookup(self)).as_ref()
    }

    /// Whether the note association has been resolved yet.
    /// Resolved-to-nothing counts as resolved.
    pub fn note_resolved(&self) -> bool {
        self.note_cache.get().is_some()
    }
}

fn contains_any(haystacks: &[String], needle: &str) -> bool {
    haystacks.iter().any(|h| h.to_lowercase().contains(needle))
}

fn contains_opt(haystack: &Option<String>, needle: &str) -> bool {
    haystack
        .as_deref()
        .is_some_and(|h| h.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse_query;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample() -> Entry {
        let mut entry = Entry::new(7);
        entry.key = Some("ABCD2345".to_string());
        entry.title = Some("Deep Learning".to_string());
        entry.publication = Some("Nature".to_string());
        entry.date = Some("2015".to_string());
        entry.doi = Some("10.1038/nature14539".to_string());
        entry.abstract_text = Some("Representation learning methods".to_string());
        entry.authors = vec!["Lecun".to_string(), "Bengio".to_string()];
        entry.tags = vec!["neural networks".to_string()];
        entry.collections = vec!["To Read".to_string()];
        entry
    }

    #[test]
    fn empty_terms_match_nothing() {
        assert!(!sample().matches(&[]));
        assert!(!sample().matches(&parse_query("")));
    }

    #[test]
    fn tagged_term_only_checks_its_field() {
        let entry = sample();
        assert!(entry.matches(&parse_query("title:deep")));
        assert!(entry.matches(&parse_query("deep")));
        assert!(!entry.matches(&parse_query("author:deep")));
    }

    #[test]
    fn untagged_term_searches_every_field() {
        let entry = sample();
        assert!(entry.matches(&parse_query("bengio")));
        assert!(entry.matches(&parse_query("nature")));
        assert!(entry.matches(&parse_query("2015")));
        assert!(entry.matches(&parse_query("representation")));
        assert!(!entry.matches(&parse_query("quantum")));
    }

    #[test]
    fn terms_are_conjunctive() {
        let entry = sample();
        assert!(entry.matches(&parse_query("deep lecun")));
        assert!(!entry.matches(&parse_query("deep smith")));
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let entry = sample();
        assert!(entry.matches(&parse_query("Tag:NEURAL")));
        assert!(entry.matches(&parse_query("collection:read")));
        assert!(entry.matches(&parse_query("year:201")));
    }

    #[test]
    fn missing_field_never_matches() {
        let entry = Entry::new(1);
        assert!(!entry.matches(&parse_query("title:anything")));
        assert!(!entry.matches(&parse_query("date:2015")));
    }

    struct CountingProvider {
        calls: AtomicUsize,
        hit: Option<Note>,
    }

    impl NoteProvider for CountingProvider {
        fn lookup(&self, _entry: &Entry) -> Option<Note> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.hit.clone()
        }
    }

    #[test]
    fn note_lookup_is_memoized() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
            hit: Some(Note {
                path: PathBuf::from("/notes/ABCD2345.md"),
            }),
        };
        let entry = sample();
        assert!(!entry.note_resolved());
        assert_eq!(
            entry.note(&provider).map(|n| n.path.clone()),
            Some(PathBuf::from("/notes/ABCD2345.md"))
        );
        entry.note(&provider);
        entry.note(&provider);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(entry.note_resolved());
    }

    #[test]
    fn resolved_to_nothing_is_still_resolved() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
            hit: None,
        };
        let entry = sample();
        assert!(entry.note(&provider).is_none());
        assert!(entry.note(&provider).is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(entry.note_resolved());
    }

    #[test]
    fn serializes_without_caches() {
        let entry = sample();
        entry.full_format();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["abstract"], "Representation learning methods");
        assert!(json.get("full_cache").is_none());
    }
}
