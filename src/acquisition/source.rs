//! Audio source backed by the `yt-dlp` command-line tool.
//!
//! We shell out to yt-dlp rather than reimplementing its extractors. It
//! searches the video platform, picks the best audio stream, and converts it
//! to MP3 with ffmpeg.
//!
//! Install yt-dlp:
//! - Windows: `winget install yt-dlp`
//! - macOS: `brew install yt-dlp`
//! - Linux: `pipx install yt-dlp` or the distribution package

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use async_trait::async_trait;

use super::AcquisitionError;
use crate::organizer::AUDIO_EXTENSION;

/// Prefix of provider-neutral search queries
pub const SEARCH_PREFIX: &str = "search:";

/// Common installation paths for yt-dlp on Windows
#[cfg(windows)]
const YTDLP_PATHS: &[&str] = &[
    "yt-dlp", // In PATH
    r"C:\Program Files\yt-dlp\yt-dlp.exe",
];

#[cfg(not(windows))]
const YTDLP_PATHS: &[&str] = &[
    "yt-dlp", // In PATH
    "/usr/bin/yt-dlp",
    "/usr/local/bin/yt-dlp",
    "/opt/homebrew/bin/yt-dlp",
];

/// Somewhere audio can be searched for and downloaded.
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Search for `query` (`search:<terms>`) and save the best match at
    /// `destination` plus the audio extension.
    ///
    /// Finding nothing is not an error; callers check whether the file
    /// exists afterwards.
    async fn fetch(&self, query: &str, destination: &Path) -> Result<(), AcquisitionError>;
}

/// yt-dlp subprocess wrapper
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: String,
}

impl YtDlp {
    /// Use a specific executable
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find yt-dlp, checking common installation paths
    pub fn locate() -> Option<Self> {
        YTDLP_PATHS
            .iter()
            .find(|&path| version_of(path).is_some())
            .map(|path| Self::new(*path))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the yt-dlp version string (for diagnostics)
    pub fn version(&self) -> Option<String> {
        version_of(&self.program)
    }

    fn arguments(target: &str, destination: &Path) -> Vec<OsString> {
        let mut template = destination.as_os_str().to_os_string();
        template.push(".%(ext)s");

        let mut args: Vec<OsString> = [
            "--quiet",
            "--no-warnings",
            "--no-playlist",
            "--format",
            "bestaudio/best",
            "--extract-audio",
            "--audio-format",
            AUDIO_EXTENSION,
            "--audio-quality",
            "0",
            "--output",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(template);
        args.push(target.into());
        args
    }
}

#[async_trait]
impl AudioSource for YtDlp {
    async fn fetch(&self, query: &str, destination: &Path) -> Result<(), AcquisitionError> {
        let target = to_ytdlp_target(query);
        tracing::debug!("Running {} for {:?}", self.program, target);

        let output = tokio::process::Command::new(&self.program)
            .args(Self::arguments(&target, destination))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => AcquisitionError::ToolMissing(self.program.clone()),
                _ => AcquisitionError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AcquisitionError::Process(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Map a provider-neutral query onto yt-dlp's single-result search syntax
pub fn to_ytdlp_target(query: &str) -> String {
    match query.strip_prefix(SEARCH_PREFIX) {
        Some(terms) => format!("ytsearch1:{}", terms.trim()),
        None => query.to_string(),
    }
}

fn version_of(program: &str) -> Option<String> {
    Command::new(program)
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}
