//! Snapshot management for the Zotero database.
//!
//! The live `zotero.sqlite` may have a concurrent writer (Zotero
//! itself), so the index never reads it directly. Every rebuild copies
//! the file to a private snapshot path first and opens the copy
//! read-only. The snapshot is overwritten on the next rebuild and never
//! cleaned up in between.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::error::LibraryError;

/// Copy the live database to `snapshot` and open the copy read-only.
///
/// Copy failures are [`LibraryError::SourceUnavailable`]; failures to
/// open the freshly written copy are [`LibraryError::Snapshot`].
pub async fn open_snapshot(source: &Path, snapshot: &Path) -> Result<SqlitePool, LibraryError> {
    if let Some(parent) = snapshot.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(source, snapshot)?;

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", snapshot.display()))?
        .read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}
