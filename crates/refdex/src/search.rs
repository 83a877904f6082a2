//! The `refdex search` command.

use anyhow::Result;
use serde_json::json;

use crate::config::Config;
use crate::library::Library;
use crate::notes_md::MarkdownNotes;

pub struct SearchOptions {
    pub json: bool,
    pub limit: Option<usize>,
    pub attachments: bool,
}

pub async fn run_search(config: &Config, query: &str, opts: &SearchOptions) -> Result<()> {
    if query.trim().len() < config.search.min_query_length {
        println!(
            "query too short (minimum {} characters)",
            config.search.min_query_length
        );
        return Ok(());
    }

    let mut library = Library::from_config(config);
    let mut results = library.search(query).await?;
    if let Some(limit) = opts.limit {
        results.truncate(limit);
    }

    let note_provider: Option<MarkdownNotes> = config
        .notes
        .root
        .clone()
        .map(MarkdownNotes::new);

    if opts.json {
        let items: Vec<serde_json::Value> = results
            .iter()
            .map(|entry| {
                let mut value = serde_json::to_value(entry.as_ref())?;
                if let Some(provider) = &note_provider {
                    value["note"] = json!(entry.note(provider));
                }
                Ok(value)
            })
            .collect::<Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("no matches for '{}'", query);
        return Ok(());
    }

    for entry in &results {
        println!("{}", entry.full_format());
        if opts.attachments {
            for attachment in &entry.attachments {
                println!("  attachment: {}", attachment.display());
            }
        }
        if let Some(provider) = &note_provider {
            if let Some(note) = entry.note(provider) {
                println!("  note: {}", note.path.display());
            }
        }
        println!();
    }
    println!("{} result(s)", results.len());
    Ok(())
}
