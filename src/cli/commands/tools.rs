//! External tool and credential checks.

use std::path::Path;

use super::{load_config, print_ytdlp_install_instructions};
use crate::acquisition::YtDlp;
use crate::config::{self, Overrides};

/// Report yt-dlp availability and whether credentials are configured
pub fn cmd_check_tools(config_file: Option<&Path>) -> anyhow::Result<()> {
    println!("Checking download tools...\n");

    let config = load_config(config_file, Overrides {
        client_id: std::env::var("SPOTIFY_CLIENT").ok(),
        client_secret: std::env::var("SPOTIFY_SECRET").ok(),
        ..Default::default()
    })?;

    let source = match &config.download.ytdlp_path {
        Some(program) => Some(YtDlp::new(program.clone())),
        None => YtDlp::locate(),
    };
    match source.as_ref().and_then(|s| s.version().map(|v| (s.program(), v))) {
        Some((program, version)) => println!("✓ yt-dlp: {} ({})", version, program),
        None => {
            println!("✗ yt-dlp: NOT FOUND");
            print_ytdlp_install_instructions();
        }
    }

    println!();
    println!("Credentials:");
    match config.catalog_config() {
        Ok(_) => println!("✓ Catalog client ID and secret: set"),
        Err(e) => {
            println!("✗ {}", e);
            println!("  Create an app at: https://developer.spotify.com/dashboard");
        }
    }

    println!();
    match config_file.map(Path::to_path_buf).or_else(config::config_path) {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!("Config file: {} (not present, using defaults)", path.display()),
        None => println!("Config file: no config directory on this system"),
    }

    Ok(())
}
