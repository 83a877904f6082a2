//! # Refdex CLI (`refdex`)
//!
//! The `refdex` binary is the thin shell over the index: it loads the
//! TOML configuration, runs one command against the [`Library`], and
//! prints the result.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `refdex search "<query>"` | Search the library (`author:doe 2020`) |
//! | `refdex status` | Source availability and index statistics |
//! | `refdex collections` | List collection labels seen at last rebuild |
//! | `refdex tags` | List tag labels seen at last rebuild |
//!
//! ## Examples
//!
//! ```bash
//! refdex search "smith year:2019" --config ./config/refdex.toml
//! refdex search "tag:neuroscience" --json
//! refdex status
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use refdex::config::load_config;
use refdex::search::{run_search, SearchOptions};
use refdex::status::{run_collections, run_status, run_tags};

/// Refdex — a local-first bibliographic index and search engine for
/// Zotero libraries.
///
/// All commands accept a `--config` flag pointing to a TOML
/// configuration file. See `config/refdex.example.toml`.
#[derive(Parser)]
#[command(
    name = "refdex",
    about = "Refdex — search a Zotero library from the command line",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/refdex.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the library.
    ///
    /// Free text matches every field; `tag:`, `collection:`, `author:`,
    /// `editor:`, `date:`/`year:`, `publication:`/`journal:`, `title:`,
    /// `doi:` and `abs:` qualify a term to one field. Terms are ANDed.
    Search {
        /// The search query.
        query: String,

        /// Emit results as JSON.
        #[arg(long)]
        json: bool,

        /// Maximum number of results to print.
        #[arg(long)]
        limit: Option<usize>,

        /// Also print full-text attachment paths.
        #[arg(long)]
        attachments: bool,
    },

    /// Show source availability and index statistics.
    Status,

    /// List collection labels seen at the last rebuild.
    Collections,

    /// List tag labels seen at the last rebuild.
    Tags,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Search {
            query,
            json,
            limit,
            attachments,
        } => {
            run_search(
                &config,
                &query,
                &SearchOptions {
                    json,
                    limit,
                    attachments,
                },
            )
            .await
        }
        Commands::Status => run_status(&config).await,
        Commands::Collections => run_collections(&config).await,
        Commands::Tags => run_tags(&config).await,
    }
}
