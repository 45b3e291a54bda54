//! Command-line interface for the harvester.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::citation::{self, CitationStyle};
use crate::config::HarvestConfig;
use crate::error::{HarvesterError, Result};
use crate::harvester::{DocumentOutcome, Harvester};
use crate::manifest::SourceManifest;

/// Fagui Harvester - Download Chinese legislation and split it into articles.
#[derive(Parser)]
#[command(name = "fagui-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Harvest every document in a source manifest into YAML artifacts.
    Harvest {
        /// Source manifest (YAML)
        manifest: PathBuf,

        /// Artifact directory (default: $FAGUI_OUTPUT_DIR or data/artifacts)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a citation and print it in another style.
    Cite {
        /// Citation text, e.g. "《个人信息保护法》第二十一条"
        text: String,

        /// Output style: chinese, english, full, short or pinpoint
        #[arg(short, long, default_value = "chinese")]
        style: CitationStyle,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Harvest { manifest, output } => harvest_command(&manifest, output.as_deref()),
        Commands::Cite { text, style } => cite_command(&text, style),
    }
}

/// Execute the harvest command.
fn harvest_command(manifest_path: &Path, output: Option<&Path>) -> Result<()> {
    let mut config = HarvestConfig::from_env();
    if let Some(output_dir) = output {
        if output_dir.exists() && !output_dir.is_dir() {
            return Err(HarvesterError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Output path is not a directory: {}", output_dir.display()),
            )));
        }
        config = config.with_output_dir(output_dir);
    }

    // Validate the manifest before making HTTP requests
    let manifest = SourceManifest::load(manifest_path)?;

    let harvester = Harvester::new(config)?;
    println!(
        "{} {} document(s) into {}",
        style("Harvesting").bold(),
        style(manifest.len()).cyan(),
        style(harvester.config().output_dir.display()).green()
    );
    println!();

    let pb = ProgressBar::new(manifest.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30}] {pos}/{len} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let report = harvester.run(&manifest, |entry, outcome| {
        let id = &entry.document.id;
        match outcome {
            DocumentOutcome::Skipped => pb.set_message(format!("{id} (exists)")),
            DocumentOutcome::Harvested { provisions, .. } => {
                pb.set_message(format!("{id}: {provisions} articles"));
            }
            DocumentOutcome::Failed(_) => {
                pb.println(format!("  {} {id}", style("failed").red()));
            }
        }
        pb.inc(1);
    });
    pb.finish_and_clear();
    let report = report?;

    println!("  Harvested: {}", style(report.harvested).green());
    println!("  Skipped:   {}", report.skipped);
    println!("  Articles:  {}", report.provisions);
    if report.conflicts > 0 {
        println!("  Conflicts: {}", style(report.conflicts).yellow().bold());
    }
    if report.failed > 0 {
        println!("  Failed:    {}", style(report.failed).red().bold());
        for (id, reason) in &report.failures {
            println!("    {id}: {reason}");
        }
    }

    Ok(())
}

/// Execute the cite command.
fn cite_command(text: &str, citation_style: CitationStyle) -> Result<()> {
    let parsed = citation::parse(text);
    if !parsed.valid {
        println!(
            "{} {}",
            style("Invalid:").red().bold(),
            parsed.error.as_deref().unwrap_or_default()
        );
        return Ok(());
    }

    println!("{}", citation::format(&parsed, citation_style));
    Ok(())
}
