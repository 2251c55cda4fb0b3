//! Core data models for resolved catalog content.
//!
//! Defines the primary entities: [`Track`] and [`Album`], plus the per-track
//! [`Outcome`] produced by the acquisition pipeline.
//!
//! Tracks are immutable once built by the resolver. Albums are shared between
//! the tracks that belong to them through an [`Arc`], so expanding a 20-track
//! album allocates the album metadata once.

use std::fmt;
use std::sync::Arc;

/// An album as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    /// Album title
    pub name: String,
    /// Credited album artists, in catalog order
    pub artists: Vec<String>,
    /// Largest available cover image
    pub cover_url: Option<String>,
    /// Release date (YYYY, YYYY-MM, or YYYY-MM-DD)
    pub release_date: String,
}

/// International Standard Recording Code.
///
/// Either a well-formed 12 character code (`CCXXXYYNNNNN`) or explicitly
/// empty. Hyphenated input is normalized; anything else becomes empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Isrc(String);

impl Isrc {
    /// Parse a raw ISRC, returning an empty code if it is malformed.
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if Self::is_well_formed(&normalized) {
            Self(normalized)
        } else {
            if !normalized.is_empty() {
                tracing::debug!("Ignoring malformed ISRC {:?}", raw);
            }
            Self::default()
        }
    }

    /// An explicitly empty code
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_well_formed(code: &str) -> bool {
        let bytes = code.as_bytes();
        bytes.len() == 12
            && bytes[..2].iter().all(u8::is_ascii_uppercase)
            && bytes[2..5].iter().all(u8::is_ascii_alphanumeric)
            && bytes[5..].iter().all(u8::is_ascii_digit)
    }
}

impl fmt::Display for Isrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single resolved track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Catalog track ID
    pub id: String,
    /// Track title
    pub title: String,
    /// Credited artists, lead artist first
    pub artists: Vec<String>,
    /// Album this track belongs to
    pub album: Arc<Album>,
    /// Recording code used as the primary audio search key
    pub isrc: Isrc,
    /// Position on the disc, always >= 1
    pub track_number: u32,
    /// Disc number, always >= 1
    pub disc_number: u32,
}

impl Track {
    /// The lead artist, if the catalog credited anyone.
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(String::as_str)
    }
}

/// Position of a track within a batch, for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based position
    pub position: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}]", self.position, self.total)
    }
}

/// What happened to one track during acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Downloaded and fully tagged
    Tagged,
    /// Downloaded, but tagging failed (the audio file is kept)
    DownloadedUntagged(String),
    /// The file was already on disk, nothing was searched or downloaded
    AlreadyPresent,
    /// Neither the ISRC nor the name search produced a file
    NotFound,
    /// Something outside the search itself broke
    Failed(String),
}

impl Outcome {
    /// Whether an audio file for the track exists after this outcome.
    pub fn has_audio(&self) -> bool {
        matches!(
            self,
            Outcome::Tagged | Outcome::DownloadedUntagged(_) | Outcome::AlreadyPresent
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Tagged => f.write_str("downloaded and tagged"),
            Outcome::DownloadedUntagged(reason) => write!(f, "downloaded, untagged ({})", reason),
            Outcome::AlreadyPresent => f.write_str("already present"),
            Outcome::NotFound => f.write_str("not found"),
            Outcome::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isrc_accepts_well_formed_code() {
        let isrc = Isrc::parse("usum71703861");
        assert_eq!(isrc.as_str(), "USUM71703861");
    }

    #[test]
    fn test_isrc_strips_hyphens() {
        let isrc = Isrc::parse("GB-AYE-69-00531");
        assert_eq!(isrc.as_str(), "GBAYE6900531");
    }

    #[test]
    fn test_isrc_rejects_malformed_code() {
        assert!(Isrc::parse("not an isrc").is_empty());
        assert!(Isrc::parse("US12").is_empty());
        assert!(Isrc::parse("").is_empty());
    }

    #[test]
    fn test_primary_artist() {
        let track = crate::test_utils::mock_track("Song", 1);
        assert_eq!(track.primary_artist(), Some("Test Artist"));

        let anonymous = Track {
            artists: vec![],
            ..track
        };
        assert_eq!(anonymous.primary_artist(), None);
    }

    #[test]
    fn test_outcome_has_audio() {
        assert!(Outcome::Tagged.has_audio());
        assert!(Outcome::AlreadyPresent.has_audio());
        assert!(Outcome::DownloadedUntagged("bad cover".into()).has_audio());
        assert!(!Outcome::NotFound.has_audio());
        assert!(!Outcome::Failed("io".into()).has_audio());
    }

    #[test]
    fn test_progress_display() {
        let progress = Progress {
            position: 3,
            total: 12,
        };
        assert_eq!(progress.to_string(), "[3/12]");
    }
}
