//! The bibliographic index: snapshot, rebuild, and search.
//!
//! [`Library`] owns a private snapshot copy of `zotero.sqlite` and an
//! in-memory map from item id to [`Entry`]. A rebuild runs whenever the
//! live database's modification time advances past the one recorded at
//! the previous rebuild (or on first use, or when forced), and fully
//! replaces the map — entries are never patched in place. Search
//! results are cached per raw query string until the next rebuild.
//!
//! # Rebuild passes
//!
//! 1. Snapshot the live database (see [`crate::db`]).
//! 2. Collect deleted and retracted item ids; these are excluded from
//!    every admission step below except tag attachment.
//! 3. Resolve the `attachment` item-type id — attachment pseudo-items
//!    share the field table with real entries and must be skipped.
//! 4. General fields: route each (item, field, value) row to the entry,
//!    creating it on first sight.
//! 5. Authors, 6. editors: surnames in creator order, capitalized.
//! 7. Collections: per-entry membership plus the collection label index.
//! 8. Tags: attach only to entries already admitted, plus the tag label
//!    index — a tag row alone never creates an entry.
//! 9. Attachments: resolve `storage:` paths into the storage folder via
//!    the attachment item's key, filtered by the full-text extension
//!    allow-list; linked paths are stored raw.
//! 10. Record the source modification time.
//!
//! The whole new state is built before any of it is published, so a
//! failed rebuild leaves the previous index serving.

use sqlx::Row;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use tracing::{debug, info, warn};

use refdex_core::models::Entry;
use refdex_core::query::parse_query;

use crate::config::Config;
use crate::db;
use crate::error::LibraryError;

/// Extensions recognized as full-text attachments.
const FULLTEXT_EXTENSIONS: [&str; 4] = ["pdf", "epub", "djvu", "html"];

/// Date values containing one of these are stored verbatim instead of
/// being truncated to a year.
const SPECIAL_DATES: [&str; 4] = ["in press", "submitted", "in preparation", "unpublished"];

/// Prefix marking an attachment stored inside the Zotero folder.
const STORAGE_PREFIX: &str = "storage:";

const DELETED_QUERY: &str = "SELECT itemID FROM deletedItems";

const RETRACTED_QUERY: &str = "SELECT itemID FROM retractedItems";

const ATTACHMENT_TYPE_QUERY: &str =
    "SELECT itemTypeID FROM itemTypes WHERE typeName = 'attachment'";

const INFO_QUERY: &str = r#"
    SELECT items.itemID AS itemID, items.itemTypeID AS itemTypeID,
           fields.fieldName AS fieldName, itemDataValues.value AS value,
           items.key AS key
    FROM items, itemData, fields, itemDataValues
    WHERE items.itemID = itemData.itemID
      AND itemData.fieldID = fields.fieldID
      AND itemData.valueID = itemDataValues.valueID
      AND fields.fieldName IN (
          'date', 'title', 'publicationTitle', 'programTitle', 'websiteTitle',
          'proceedingsTitle', 'forumTitle', 'encyclopediaTitle',
          'dictionaryTitle', 'bookTitle', 'blogTitle', 'subject', 'url',
          'abstractNote', 'DOI', 'volume', 'issue')
"#;

const AUTHOR_QUERY: &str = r#"
    SELECT items.itemID AS itemID, creators.lastName AS lastName
    FROM items, itemCreators, creators, creatorTypes
    WHERE items.itemID = itemCreators.itemID
      AND itemCreators.creatorID = creators.creatorID
      AND itemCreators.creatorTypeID = creatorTypes.creatorTypeID
      AND creatorTypes.creatorType = 'author'
    ORDER BY itemCreators.orderIndex
"#;

const EDITOR_QUERY: &str = r#"
    SELECT items.itemID AS itemID, creators.lastName AS lastName
    FROM items, itemCreators, creators, creatorTypes
    WHERE items.itemID = itemCreators.itemID
      AND itemCreators.creatorID = creators.creatorID
      AND itemCreators.creatorTypeID = creatorTypes.creatorTypeID
      AND creatorTypes.creatorType = 'editor'
    ORDER BY itemCreators.orderIndex
"#;

const COLLECTION_QUERY: &str = r#"
    SELECT items.itemID AS itemID, collections.collectionName AS collectionName
    FROM items, collections, collectionItems
    WHERE items.itemID = collectionItems.itemID
      AND collections.collectionID = collectionItems.collectionID
    ORDER BY collections.collectionName
"#;

const TAG_QUERY: &str = r#"
    SELECT items.itemID AS itemID, tags.name AS name
    FROM items, tags, itemTags
    WHERE items.itemID = itemTags.itemID
      AND tags.tagID = itemTags.tagID
"#;

const ATTACHMENT_QUERY: &str = r#"
    SELECT items.itemID AS parentID, itemAttachments.path AS path,
           itemAttachments.itemID AS attachmentID
    FROM items, itemAttachments
    WHERE items.itemID = itemAttachments.parentItemID
"#;

const ITEM_KEY_QUERY: &str = "SELECT key FROM items WHERE itemID = ?";

/// The searchable index over one Zotero library.
pub struct Library {
    database_path: PathBuf,
    storage_path: PathBuf,
    snapshot_path: PathBuf,
    records: HashMap<i64, Arc<Entry>>,
    known_collections: BTreeSet<String>,
    known_tags: BTreeSet<String>,
    query_cache: HashMap<String, Vec<Arc<Entry>>>,
    last_rebuild: Option<SystemTime>,
    rebuild_count: u64,
}

impl Library {
    /// An index over the Zotero folder at `library_dir`, snapshotting
    /// to `snapshot_path`. Nothing is read until the first
    /// [`ensure_fresh`](Library::ensure_fresh) or
    /// [`search`](Library::search).
    pub fn open(library_dir: &Path, snapshot_path: PathBuf) -> Library {
        Library {
            database_path: library_dir.join("zotero.sqlite"),
            storage_path: library_dir.join("storage"),
            snapshot_path,
            records: HashMap::new(),
            known_collections: BTreeSet::new(),
            known_tags: BTreeSet::new(),
            query_cache: HashMap::new(),
            last_rebuild: None,
            rebuild_count: 0,
        }
    }

    pub fn from_config(config: &Config) -> Library {
        Library::open(&config.library.path, config.library.snapshot_path())
    }

    /// Bring the index up to date with the live database.
    ///
    /// Returns `Ok(false)` when the live database cannot be accessed;
    /// the previous index (possibly empty) keeps serving. Returns an
    /// error only for schema mismatches and snapshot read failures,
    /// which must not be masked as mere staleness. Otherwise rebuilds
    /// when forced, on first call, or when the source modification time
    /// has advanced, and returns `Ok(true)`.
    pub async fn ensure_fresh(&mut self, force: bool) -> Result<bool, LibraryError> {
        let mtime = match std::fs::metadata(&self.database_path).and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(err) => {
                warn!(
                    database = %self.database_path.display(),
                    %err,
                    "source database unavailable"
                );
                return Ok(false);
            }
        };

        let stale = force || self.last_rebuild.map_or(true, |last| mtime > last);
        if !stale {
            return Ok(true);
        }

        match self.rebuild(mtime).await {
            Ok(()) => Ok(true),
            Err(LibraryError::SourceUnavailable { source }) => {
                warn!(
                    database = %self.database_path.display(),
                    err = %source,
                    "snapshot copy failed, serving previous index"
                );
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Search the index.
    ///
    /// Fails soft: an unreachable source or an empty-after-parsing
    /// query yields an empty result, never an error. Results for the
    /// exact raw query string are cached until the next rebuild, so
    /// repeated queries return the identical sequence. Result order
    /// across distinct evaluations is unspecified — callers get every
    /// match exactly once and nothing more.
    pub async fn search(&mut self, query: &str) -> Result<Vec<Arc<Entry>>, LibraryError> {
        if !self.ensure_fresh(false).await? {
            return Ok(Vec::new());
        }
        if let Some(cached) = self.query_cache.get(query) {
            debug!(query, hits = cached.len(), "query cache hit");
            return Ok(cached.clone());
        }

        let terms = parse_query(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let results: Vec<Arc<Entry>> = self
            .records
            .values()
            .filter(|entry| entry.matches(&terms))
            .cloned()
            .collect();
        debug!(
            query,
            hits = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search completed"
        );
        self.query_cache.insert(query.to_string(), results.clone());
        Ok(results)
    }

    async fn rebuild(&mut self, mtime: SystemTime) -> Result<(), LibraryError> {
        let started = Instant::now();
        let pool = db::open_snapshot(&self.database_path, &self.snapshot_path).await?;

        let mut records: HashMap<i64, Entry> = HashMap::new();
        let mut known_collections = BTreeSet::new();
        let mut known_tags = BTreeSet::new();

        let mut excluded: HashSet<i64> = HashSet::new();
        for query in [DELETED_QUERY, RETRACTED_QUERY] {
            let ids: Vec<i64> = sqlx::query_scalar(query).fetch_all(&pool).await?;
            excluded.extend(ids);
        }

        // Attachments are items too and pollute the field table; their
        // type id tells the general-fields pass what to skip.
        let attachment_type: i64 = sqlx::query_scalar(ATTACHMENT_TYPE_QUERY)
            .fetch_optional(&pool)
            .await?
            .ok_or_else(|| LibraryError::SchemaMismatch {
                detail: "itemTypes has no 'attachment' row".to_string(),
            })?;

        for row in sqlx::query(INFO_QUERY).fetch_all(&pool).await? {
            let type_id: i64 = row.get("itemTypeID");
            if type_id == attachment_type {
                continue;
            }
            let id: i64 = row.get("itemID");
            if excluded.contains(&id) {
                continue;
            }
            let field: String = row.get("fieldName");
            let value: String = row.get("value");
            let key: String = row.get("key");
            let entry = records.entry(id).or_insert_with(|| Entry::new(id));
            if entry.key.is_none() {
                entry.key = Some(key);
            }
            apply_field(entry, &field, value);
        }

        for row in sqlx::query(AUTHOR_QUERY).fetch_all(&pool).await? {
            let id: i64 = row.get("itemID");
            if excluded.contains(&id) {
                continue;
            }
            let surname: String = row.get("lastName");
            records
                .entry(id)
                .or_insert_with(|| Entry::new(id))
                .authors
                .push(capitalize_words(&surname));
        }

        for row in sqlx::query(EDITOR_QUERY).fetch_all(&pool).await? {
            let id: i64 = row.get("itemID");
            if excluded.contains(&id) {
                continue;
            }
            let surname: String = row.get("lastName");
            records
                .entry(id)
                .or_insert_with(|| Entry::new(id))
                .editors
                .push(capitalize_words(&surname));
        }

        for row in sqlx::query(COLLECTION_QUERY).fetch_all(&pool).await? {
            let id: i64 = row.get("itemID");
            if excluded.contains(&id) {
                continue;
            }
            let name: String = row.get("collectionName");
            records
                .entry(id)
                .or_insert_with(|| Entry::new(id))
                .collections
                .push(name.clone());
            known_collections.insert(name);
        }

        // Tags never admit new ids: an id excluded above, or one that
        // exists only as a tag row, stays out and its tags with it.
        for row in sqlx::query(TAG_QUERY).fetch_all(&pool).await? {
            let id: i64 = row.get("itemID");
            if let Some(entry) = records.get_mut(&id) {
                let name: String = row.get("name");
                entry.tags.push(name.clone());
                known_tags.insert(name);
            }
        }

        for row in sqlx::query(ATTACHMENT_QUERY).fetch_all(&pool).await? {
            let id: i64 = row.get("parentID");
            if excluded.contains(&id) {
                continue;
            }
            let path: Option<String> = row.get("path");
            let Some(path) = path else { continue };

            if let Some(relative) = path.strip_prefix(STORAGE_PREFIX) {
                if !has_fulltext_extension(relative) {
                    continue;
                }
                let attachment_id: i64 = row.get("attachmentID");
                let key: Option<String> = sqlx::query_scalar(ITEM_KEY_QUERY)
                    .bind(attachment_id)
                    .fetch_optional(&pool)
                    .await?;
                let Some(key) = key else {
                    debug!(attachment_id, "attachment item has no key, skipping");
                    continue;
                };
                records
                    .entry(id)
                    .or_insert_with(|| Entry::new(id))
                    .attachments
                    .push(self.storage_path.join(key).join(relative));
            } else {
                // Linked attachments carry the full path already.
                records
                    .entry(id)
                    .or_insert_with(|| Entry::new(id))
                    .attachments
                    .push(PathBuf::from(path));
            }
        }

        pool.close().await;

        // Publish the finished state in one step.
        self.records = records
            .into_iter()
            .map(|(id, entry)| (id, Arc::new(entry)))
            .collect();
        self.known_collections = known_collections;
        self.known_tags = known_tags;
        self.query_cache.clear();
        self.last_rebuild = Some(mtime);
        self.rebuild_count += 1;

        info!(
            entries = self.records.len(),
            collections = self.known_collections.len(),
            tags = self.known_tags.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "index rebuilt"
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Collection labels seen during the last rebuild, sorted.
    pub fn collections(&self) -> &BTreeSet<String> {
        &self.known_collections
    }

    /// Tag labels seen during the last rebuild, sorted.
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.known_tags
    }

    /// Source modification time at the last successful rebuild.
    pub fn last_rebuild(&self) -> Option<SystemTime> {
        self.last_rebuild
    }

    /// Number of completed rebuilds since this `Library` was opened.
    pub fn rebuilds(&self) -> u64 {
        self.rebuild_count
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }
}

/// Route one general-fields row into the entry. The many venue title
/// fields all fold into `publication`; `subject` is the title of email
/// items. Unknown field names are ignored.
fn apply_field(entry: &mut Entry, field: &str, value: String) {
    match field {
        "title" | "subject" => entry.title = Some(value),
        "publicationTitle" | "bookTitle" | "blogTitle" | "encyclopediaTitle"
        | "proceedingsTitle" | "programTitle" | "dictionaryTitle" | "forumTitle"
        | "websiteTitle" => entry.publication = Some(value),
        "date" => entry.date = Some(parse_date(&value)),
        "volume" => entry.volume = Some(value),
        "issue" => entry.issue = Some(value),
        "DOI" => entry.doi = Some(value),
        "url" => entry.url = Some(value),
        "abstractNote" => entry.abstract_text = Some(value),
        _ => {}
    }
}

/// Reduce a raw date value to a 4-character year, keeping the special
/// literals ("in press" and friends) verbatim.
fn parse_date(raw: &str) -> String {
    let lower = raw.to_lowercase();
    for special in SPECIAL_DATES {
        if lower.contains(special) {
            return special.to_string();
        }
    }
    raw.chars().take(4).collect()
}

/// Uppercase the first letter of each whitespace-separated word,
/// lowercasing the rest.
fn capitalize_words(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn has_fulltext_extension(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            FULLTEXT_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}
