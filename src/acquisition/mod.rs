//! Turning a resolved track into a tagged audio file.
//!
//! For each track the engine:
//! 1. works out the destination under the output root,
//! 2. skips the track if the audio file is already there,
//! 3. searches by ISRC, then by `<title> by <lead artist>`,
//! 4. tags whatever was downloaded.
//!
//! Every failure is folded into an [`Outcome`]; nothing here aborts a batch.

pub mod source;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use source::{AudioSource, SEARCH_PREFIX, YtDlp};

use crate::model::{Outcome, Progress, Track};
use crate::organizer::{audio_path, destination_for};
use crate::tagger::TrackTagger;

/// Errors from the audio source
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("{0} is not installed or not on PATH")]
    ToolMissing(String),

    #[error("Download failed: {0}")]
    Process(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The search queries tried for a track, in order.
///
/// The ISRC query is left out when the track has no ISRC.
pub fn search_queries(track: &Track) -> Vec<String> {
    let mut queries = Vec::with_capacity(2);
    if !track.isrc.is_empty() {
        queries.push(format!("{}{}", SEARCH_PREFIX, track.isrc));
    }
    match track.primary_artist() {
        Some(artist) => queries.push(format!("{}{} by {}", SEARCH_PREFIX, track.title, artist)),
        None => queries.push(format!("{}{}", SEARCH_PREFIX, track.title)),
    }
    queries
}

/// Downloads and tags tracks under one output root.
#[derive(Clone)]
pub struct AcquisitionEngine {
    /// `None` for engines that only tag files already on disk
    source: Option<Arc<dyn AudioSource>>,
    tagger: Arc<dyn TrackTagger>,
    output_root: PathBuf,
}

impl AcquisitionEngine {
    pub fn new(
        source: Arc<dyn AudioSource>,
        tagger: Arc<dyn TrackTagger>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: Some(source),
            tagger,
            output_root: output_root.into(),
        }
    }

    /// An engine that can only [`retag`](Self::retag) existing files.
    pub fn tagging_only(tagger: Arc<dyn TrackTagger>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            source: None,
            tagger,
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Fetch and tag one track.
    pub async fn acquire(&self, track: &Track, progress: Progress) -> Outcome {
        let destination = destination_for(&self.output_root, track);
        let audio = audio_path(&destination);

        if audio.exists() {
            tracing::info!("{} Already downloaded: {}", progress, track.title);
            return Outcome::AlreadyPresent;
        }

        let Some(source) = &self.source else {
            tracing::error!("{} No audio source for {}", progress, track.title);
            return Outcome::Failed("no audio source configured".to_string());
        };

        if let Some(album_dir) = destination.parent()
            && let Err(e) = tokio::fs::create_dir_all(album_dir).await
        {
            tracing::error!("{} Cannot create {}: {}", progress, album_dir.display(), e);
            return Outcome::Failed(format!("cannot create {}: {}", album_dir.display(), e));
        }

        tracing::info!("{} Searching for {}", progress, track.title);
        for query in search_queries(track) {
            match source.fetch(&query, &destination).await {
                Ok(()) => {}
                Err(AcquisitionError::ToolMissing(tool)) => {
                    return Outcome::Failed(format!("{} is not installed", tool));
                }
                Err(e) => {
                    tracing::warn!("{} Query {:?} failed: {}", progress, query, e);
                }
            }

            if audio.exists() {
                break;
            }
            tracing::debug!("{} No result for {:?}", progress, query);
        }

        if !audio.exists() {
            tracing::warn!("{} Not found: {}", progress, track.title);
            return Outcome::NotFound;
        }

        self.tag(track, &destination, progress).await
    }

    /// Tag a track that is already on disk, without downloading anything.
    pub async fn retag(&self, track: &Track, progress: Progress) -> Outcome {
        let destination = destination_for(&self.output_root, track);
        if !audio_path(&destination).exists() {
            tracing::warn!("{} Nothing to tag for {}", progress, track.title);
            return Outcome::NotFound;
        }
        self.tag(track, &destination, progress).await
    }

    async fn tag(&self, track: &Track, destination: &Path, progress: Progress) -> Outcome {
        match self.tagger.tag(track, destination, progress).await {
            Ok(()) => Outcome::Tagged,
            Err(e) => {
                tracing::warn!("{} Tagging {} failed: {}", progress, track.title, e);
                Outcome::DownloadedUntagged(e.to_string())
            }
        }
    }
}
