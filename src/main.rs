//! spotsnake - download Spotify tracks, albums, playlists and artists as tagged MP3s.
//!
//! Catalog links are expanded into track lists, each track is found with
//! yt-dlp (by ISRC first, then by name), tagged from the catalog metadata and
//! the batch is optionally packaged into a zip archive.

pub mod acquisition;
pub mod batch;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod organizer;
pub mod package;
pub mod reference;
pub mod resolver;
pub mod tagger;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("spotsnake=info".parse()?))
        .init();

    cli::run_command(&args)
}
