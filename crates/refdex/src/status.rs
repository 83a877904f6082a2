//! The `refdex status`, `collections`, and `tags` commands.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::time::SystemTime;

use crate::config::{is_zotero_folder, Config};
use crate::library::Library;

fn format_time(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

pub async fn run_status(config: &Config) -> Result<()> {
    println!("library: {}", config.library.path.display());
    if !is_zotero_folder(&config.library.path) {
        println!("  not a Zotero folder (no zotero.sqlite)");
        return Ok(());
    }

    let mut library = Library::from_config(config);
    let fresh = library.ensure_fresh(false).await?;

    println!("source: {}", library.database_path().display());
    println!("snapshot: {}", library.snapshot_path().display());
    println!("available: {}", fresh);
    println!("entries: {}", library.len());
    println!("collections: {}", library.collections().len());
    println!("tags: {}", library.tags().len());
    match library.last_rebuild() {
        Some(time) => println!("last rebuild: {}", format_time(time)),
        None => println!("last rebuild: never"),
    }
    println!("rebuilds: {}", library.rebuilds());
    Ok(())
}

pub async fn run_collections(config: &Config) -> Result<()> {
    let mut library = Library::from_config(config);
    library.ensure_fresh(false).await?;
    for name in library.collections() {
        println!("{}", name);
    }
    Ok(())
}

pub async fn run_tags(config: &Config) -> Result<()> {
    let mut library = Library::from_config(config);
    library.ensure_fresh(false).await?;
    for name in library.tags() {
        println!("{}", name);
    }
    Ok(())
}
