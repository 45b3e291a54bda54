//! Command-line interface for building and querying the store.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use fagui_harvester::artifact::read_artifacts;
use fagui_harvester::types::DocumentStatus;
use serde::Serialize;

use crate::builder::{build_store, read_metadata};
use crate::config::StoreConfig;
use crate::error::Result;
use crate::lookup::{get_provision, validate_citation};
use crate::schema;
use crate::search::{search, SearchRequest};

/// Fagui Store - Build and query the indexed legislation corpus.
#[derive(Parser)]
#[command(name = "fagui-store")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Store file (default: $FAGUI_DB_PATH or data/database.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the store from harvest artifacts, replacing any previous build.
    Build {
        /// Artifact directory (default: $FAGUI_ARTIFACT_DIR or data/artifacts)
        #[arg(short, long)]
        artifacts: Option<PathBuf>,

        /// Tier recorded in build metadata (default: $FAGUI_TIER or free)
        #[arg(long)]
        tier: Option<String>,
    },

    /// Full-text search over article text.
    Search {
        query: String,

        /// Restrict to one document id
        #[arg(short, long)]
        document: Option<String>,

        /// Restrict to documents with this status (e.g. in_force)
        #[arg(short, long)]
        status: Option<DocumentStatus>,

        /// Maximum number of results (1-50)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one article, or list a document's articles.
    Provision {
        /// Document id, short name or title
        document: String,

        /// Article number, e.g. 21 or 第二十一条
        reference: Option<String>,
    },

    /// Check a citation against the store.
    Validate { citation: String },

    /// Print build metadata.
    Metadata,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = StoreConfig::from_env();
    if let Some(db) = cli.db {
        config = config.with_db_path(db);
    }

    match cli.command {
        Commands::Build { artifacts, tier } => {
            if let Some(dir) = artifacts {
                config = config.with_artifact_dir(dir);
            }
            if let Some(tier) = tier {
                config = config.with_tier(tier);
            }
            build_command(&config)
        }
        Commands::Search {
            query,
            document,
            status,
            limit,
        } => {
            let mut request = SearchRequest::new(query);
            request.document_id = document;
            request.status = status;
            request.limit = limit;
            let conn = schema::open_read_only(&config.db_path)?;
            print_yaml(&search(&conn, &request)?)
        }
        Commands::Provision {
            document,
            reference,
        } => {
            let conn = schema::open_read_only(&config.db_path)?;
            print_yaml(&get_provision(&conn, &document, reference.as_deref())?)
        }
        Commands::Validate { citation } => {
            let conn = schema::open_read_only(&config.db_path)?;
            print_yaml(&validate_citation(&conn, &citation)?)
        }
        Commands::Metadata => {
            let conn = schema::open_read_only(&config.db_path)?;
            for (key, value) in read_metadata(&conn)? {
                println!("{key}: {value}");
            }
            Ok(())
        }
    }
}

fn build_command(config: &StoreConfig) -> Result<()> {
    println!(
        "{} {} from {}",
        style("Building").bold(),
        style(config.db_path.display()).cyan(),
        style(config.artifact_dir.display()).green()
    );

    let artifacts = read_artifacts(&config.artifact_dir)?;
    let summary = build_store(config, &artifacts)?;

    println!("  Documents:        {}", summary.documents);
    println!("  Articles:         {}", summary.provisions);
    println!("  Definitions:      {}", summary.definitions);
    println!("  Cross references: {}", summary.cross_references);
    if summary.unresolved_provisions > 0 {
        println!(
            "  Unresolved:       {}",
            style(summary.unresolved_provisions).yellow().bold()
        );
    }
    println!();
    println!("{} {}", style("Saved to:").green().bold(), config.db_path.display());
    Ok(())
}

fn print_yaml<T: Serialize>(value: &T) -> Result<()> {
    print!("{}", serde_yaml_ng::to_string(value)?);
    Ok(())
}
