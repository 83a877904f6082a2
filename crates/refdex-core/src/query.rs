//! Search-query parsing.
//!
//! A query is a whitespace-separated list of terms. A term is either
//! free text (`smith 2020`) or field-qualified (`author:doe`,
//! `tag:neuroscience`). A space after the colon is tolerated, so
//! `author: doe` parses the same as `author:doe`.
//!
//! Parsing never fails: empty field values are dropped silently, and a
//! token with an unrecognized tag or stray colons falls back to one
//! untagged term per colon-separated part. An empty term list is the
//! "matches nothing" query, not an error.

use serde::Serialize;

/// A searchable entry field, as named in query syntax.
///
/// Several tags are synonyms (`year` for `date`, `journal` for
/// `publication`, `abs` for the abstract) and parse to the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldTag {
    Collection,
    Tag,
    Author,
    Editor,
    Date,
    Publication,
    Title,
    Doi,
    Abstract,
}

impl FieldTag {
    /// Every searchable field, in the order an untagged term tries them.
    pub const ALL: [FieldTag; 9] = [
        FieldTag::Tag,
        FieldTag::Collection,
        FieldTag::Author,
        FieldTag::Editor,
        FieldTag::Date,
        FieldTag::Title,
        FieldTag::Publication,
        FieldTag::Doi,
        FieldTag::Abstract,
    ];

    /// Parse a query-syntax tag name, including synonyms.
    ///
    /// Returns `None` for anything outside the recognized set, which
    /// makes the token fall back to untagged terms.
    pub fn parse(tag: &str) -> Option<FieldTag> {
        match tag {
            "collection" => Some(FieldTag::Collection),
            "tag" => Some(FieldTag::Tag),
            "author" => Some(FieldTag::Author),
            "editor" => Some(FieldTag::Editor),
            "date" | "year" => Some(FieldTag::Date),
            "publication" | "journal" => Some(FieldTag::Publication),
            "title" => Some(FieldTag::Title),
            "doi" => Some(FieldTag::Doi),
            "abs" => Some(FieldTag::Abstract),
            _ => None,
        }
    }
}

/// One parsed search term: an optional field qualifier plus the
/// lowercased text to look for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryTerm {
    /// `None` means "search every field".
    pub tag: Option<FieldTag>,
    /// Needle text, already lowercased by [`parse_query`].
    pub needle: String,
}

impl QueryTerm {
    fn tagged(tag: FieldTag, needle: &str) -> QueryTerm {
        QueryTerm {
            tag: Some(tag),
            needle: needle.to_string(),
        }
    }

    fn untagged(needle: &str) -> QueryTerm {
        QueryTerm {
            tag: None,
            needle: needle.to_string(),
        }
    }
}

/// Parse a raw query string into an ordered list of terms.
///
/// The query is trimmed and lowercased, `": "` is collapsed to `":"`,
/// and each whitespace-separated token is split on colons:
///
/// - `tag:value` with a recognized tag and a non-empty value emits one
///   field-qualified term;
/// - `tag:` with an empty value is dropped;
/// - everything else emits one untagged term per non-empty part.
///
/// Term order mirrors token order.
pub fn parse_query(query: &str) -> Vec<QueryTerm> {
    let mut query = query.trim().to_lowercase();
    while query.contains(": ") {
        query = query.replace(": ", ":");
    }

    let mut terms = Vec::new();
    for token in query.split_whitespace() {
        let parts: Vec<&str> = token.split(':').collect();
        if parts.len() == 2 {
            if let Some(tag) = FieldTag::parse(parts[0]) {
                if !parts[1].is_empty() {
                    terms.push(QueryTerm::tagged(tag, parts[1]));
                }
                // An empty field value ("author: ") is a no-op.
                continue;
            }
        }
        for part in parts {
            if !part.is_empty() {
                terms.push(QueryTerm::untagged(part));
            }
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_term() {
        let terms = parse_query("author:doe");
        assert_eq!(terms, vec![QueryTerm::tagged(FieldTag::Author, "doe")]);
    }

    #[test]
    fn space_after_colon_is_collapsed() {
        assert_eq!(parse_query("author: doe"), parse_query("author:doe"));
    }

    #[test]
    fn empty_field_value_is_dropped() {
        assert!(parse_query("title:").is_empty());
        assert!(parse_query("author: ").is_empty());
    }

    #[test]
    fn free_text_splits_into_untagged_terms() {
        let terms = parse_query("smith 2020");
        assert_eq!(
            terms,
            vec![QueryTerm::untagged("smith"), QueryTerm::untagged("2020")]
        );
    }

    #[test]
    fn unrecognized_tag_falls_back_to_untagged_parts() {
        let terms = parse_query("isbn:12345");
        assert_eq!(
            terms,
            vec![QueryTerm::untagged("isbn"), QueryTerm::untagged("12345")]
        );
    }

    #[test]
    fn multiple_colons_fall_back_to_untagged_parts() {
        let terms = parse_query("a:b:c");
        assert_eq!(
            terms,
            vec![
                QueryTerm::untagged("a"),
                QueryTerm::untagged("b"),
                QueryTerm::untagged("c"),
            ]
        );
    }

    #[test]
    fn query_is_lowercased() {
        let terms = parse_query("Author:DOE Deep");
        assert_eq!(
            terms,
            vec![
                QueryTerm::tagged(FieldTag::Author, "doe"),
                QueryTerm::untagged("deep"),
            ]
        );
    }

    #[test]
    fn empty_and_whitespace_queries_parse_to_nothing() {
        assert!(parse_query("").is_empty());
        assert!(parse_query("   \t ").is_empty());
    }

    #[test]
    fn tag_synonyms() {
        assert_eq!(FieldTag::parse("year"), Some(FieldTag::Date));
        assert_eq!(FieldTag::parse("date"), Some(FieldTag::Date));
        assert_eq!(FieldTag::parse("journal"), Some(FieldTag::Publication));
        assert_eq!(FieldTag::parse("publication"), Some(FieldTag::Publication));
        assert_eq!(FieldTag::parse("abs"), Some(FieldTag::Abstract));
        assert_eq!(FieldTag::parse("abstract"), None);
    }

    #[test]
    fn mixed_query_preserves_token_order() {
        let terms = parse_query("tag:ml smith year:2019");
        assert_eq!(
            terms,
            vec![
                QueryTerm::tagged(FieldTag::Tag, "ml"),
                QueryTerm::untagged("smith"),
                QueryTerm::tagged(FieldTag::Date, "2019"),
            ]
        );
    }
}
