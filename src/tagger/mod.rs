//! Tagging downloaded audio with catalog metadata.
//!
//! The tagger writes a fixed schema (see [`TagSet`]) into the file's ID3v2
//! tag: title, artists, album artists, album, recording date, track number,
//! and the album cover as the front picture.
//!
//! Cover download happens on the async runtime; the tag rewrite itself is
//! blocking file I/O and runs on tokio's blocking pool.

pub mod cover;
pub mod tags;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

pub use cover::{CoverClient, CoverImage};
pub use tags::TagSet;

use crate::model::{Progress, Track};
use crate::organizer::audio_path;

/// Errors that can occur while tagging a file
#[derive(Debug, thiserror::Error)]
pub enum TaggingError {
    #[error("Cover download failed: {0}")]
    Cover(String),

    #[error("Invalid tag values: {0}")]
    InvalidTags(String),

    #[error("Unreadable audio file: {0}")]
    Container(String),

    #[error("Failed to write tags: {0}")]
    Write(String),

    #[error("Audio file not found: {0}")]
    MissingAudio(PathBuf),
}

/// Something that can tag a downloaded track.
#[async_trait]
pub trait TrackTagger: Send + Sync {
    /// Tag the audio file for `track` whose path, minus extension, is
    /// `destination`.
    async fn tag(
        &self,
        track: &Track,
        destination: &Path,
        progress: Progress,
    ) -> Result<(), TaggingError>;
}

/// Writes ID3v2 tags and embeds the album cover.
pub struct Id3Tagger {
    covers: CoverClient,
}

impl Id3Tagger {
    pub fn new() -> Result<Self, TaggingError> {
        Ok(Self {
            covers: CoverClient::new()?,
        })
    }
}

#[async_trait]
impl TrackTagger for Id3Tagger {
    async fn tag(
        &self,
        track: &Track,
        destination: &Path,
        progress: Progress,
    ) -> Result<(), TaggingError> {
        let path = audio_path(destination);
        if !path.exists() {
            return Err(TaggingError::MissingAudio(path));
        }

        let cover = match &track.album.cover_url {
            Some(url) => Some(self.covers.fetch(url).await?),
            None => None,
        };

        let tags = TagSet::for_track(track, cover)?;

        tracing::debug!("{} Writing tags to {}", progress, path.display());
        tokio::task::spawn_blocking(move || tags.write_to(&path))
            .await
            .map_err(|e| TaggingError::Write(format!("tag writer panicked: {}", e)))??;

        tracing::info!("{} Tagged {}", progress, track.title);
        Ok(())
    }
}
