//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `download`: Full pipeline (resolve, download, tag, package)
//! - `tag`: Tag previously downloaded files in place
//! - `resolve`: Print the tracks a batch expands to
//! - `tools`: Check external tools and credentials

mod download;
mod resolve;
mod tag;
mod tools;

use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

pub use download::cmd_download;
pub use resolve::cmd_resolve;
pub use tag::cmd_tag;
pub use tools::cmd_check_tools;

use crate::batch::BatchReport;
use crate::catalog::{CatalogConfig, SpotifyClient};
use crate::config::{self, Config, Overrides};
use crate::error::{self, ResultExt};
use crate::reference::{Batch, parse_batch};

/// spotsnake CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: the OS config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Catalog credentials, usually taken from the environment
#[derive(Args, Clone, Default)]
pub struct CredentialArgs {
    /// Catalog client ID
    #[arg(long, env = "SPOTIFY_CLIENT", hide_env_values = true)]
    pub client_id: Option<String>,
    /// Catalog client secret
    #[arg(long, env = "SPOTIFY_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Download, tag and package tracks
    Download {
        /// Links, URIs or search terms (comma or newline separated; "-" reads stdin)
        #[arg(required = true)]
        input: Vec<String>,
        /// Directory to download into
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Directory to write the zip archive to
        #[arg(long)]
        archive_dir: Option<PathBuf>,
        /// Concurrent downloads (1 = sequential)
        #[arg(short, long)]
        workers: Option<usize>,
        /// Keep the downloaded files instead of zipping them
        #[arg(long)]
        no_archive: bool,
        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Tag already downloaded tracks in place, without downloading
    Tag {
        /// Links, URIs or search terms (comma or newline separated; "-" reads stdin)
        #[arg(required = true)]
        input: Vec<String>,
        /// Directory the tracks were downloaded into
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Concurrent taggers
        #[arg(short, long)]
        workers: Option<usize>,
        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Print the tracks the input expands to
    Resolve {
        /// Links, URIs or search terms (comma or newline separated; "-" reads stdin)
        #[arg(required = true)]
        input: Vec<String>,
        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Check that yt-dlp is installed and credentials are set
    CheckTools,
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let config_file = cli.config.as_deref();

    match &cli.command {
        Commands::Download {
            input,
            output,
            archive_dir,
            workers,
            no_archive,
            credentials,
        } => {
            let overrides = Overrides {
                client_id: credentials.client_id.clone(),
                client_secret: credentials.client_secret.clone(),
                output: output.clone(),
                archive_dir: archive_dir.clone(),
                workers: *workers,
                no_archive: *no_archive,
            };
            cmd_download(&rt, config_file, overrides, input)
        }
        Commands::Tag {
            input,
            output,
            workers,
            credentials,
        } => {
            let overrides = Overrides {
                client_id: credentials.client_id.clone(),
                client_secret: credentials.client_secret.clone(),
                output: output.clone(),
                workers: *workers,
                no_archive: true,
                ..Default::default()
            };
            cmd_tag(&rt, config_file, overrides, input)
        }
        Commands::Resolve { input, credentials } => {
            let overrides = Overrides {
                client_id: credentials.client_id.clone(),
                client_secret: credentials.client_secret.clone(),
                ..Default::default()
            };
            cmd_resolve(&rt, config_file, overrides, input)
        }
        Commands::CheckTools => cmd_check_tools(config_file),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Load the config file and apply command-line overrides
pub(crate) fn load_config(path: Option<&Path>, overrides: Overrides) -> error::Result<Config> {
    let config = match path {
        Some(path) => config::load_from(path),
        None => config::load(),
    }
    .with_context("loading configuration")?;
    Ok(config.apply(overrides))
}

/// Build the catalog client
pub(crate) fn catalog_client(config: CatalogConfig) -> error::Result<SpotifyClient> {
    SpotifyClient::new(config).with_context("creating catalog client")
}

/// Join the positional arguments into one batch, reading stdin for "-"
pub(crate) fn read_batch(input: &[String]) -> error::Result<Batch> {
    let mut text = String::new();
    for part in input {
        if part == "-" {
            std::io::stdin()
                .read_to_string(&mut text)
                .with_context("reading stdin")?;
        } else {
            text.push_str(part);
        }
        text.push('\n');
    }
    parse_batch(&text).with_context("reading input")
}

/// Print the end-of-batch summary
pub(crate) fn print_report(report: &BatchReport) {
    println!();
    for failure in &report.resolution_failures {
        println!("✗ {}: {}", failure.reference, failure.error);
    }
    for (track, outcome) in &report.outcomes {
        if !matches!(outcome, crate::model::Outcome::Tagged) {
            println!("  {} - {}: {}", track.title, track.album.name, outcome);
        }
    }

    println!("\n=== Summary ===");
    println!("Tagged:              {}", report.tally.tagged);
    println!("Downloaded, untagged: {}", report.tally.downloaded_untagged);
    println!("Not found:           {}", report.tally.not_found);
    println!("Failed:              {}", report.tally.failed);
    if !report.resolution_failures.is_empty() {
        println!("Unresolved inputs:   {}", report.resolution_failures.len());
    }
    if report.cancelled {
        println!("\nCancelled before all tracks were processed.");
    }
    if let Some(archive) = &report.archive {
        println!("\nArchive: {}", archive.display());
    }
}

/// Print installation instructions for yt-dlp
pub(crate) fn print_ytdlp_install_instructions() {
    eprintln!("Error: yt-dlp not found.");
    eprintln!("Install yt-dlp (and ffmpeg for MP3 conversion):");
    eprintln!("  Windows: winget install yt-dlp");
    eprintln!("  macOS:   brew install yt-dlp");
    eprintln!("  Linux:   pipx install yt-dlp");
}
