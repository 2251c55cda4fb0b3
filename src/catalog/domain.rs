//! Catalog-facing domain types.
//!
//! These are what the resolver works with. They carry just enough of the raw
//! payloads (cursors, totals, artist IDs) to drive expansion; everything else
//! has already been folded into [`Track`] and [`Album`].

use std::sync::Arc;

use crate::model::{Album, Isrc, Track};

/// Default Web API base URL
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";

/// Default accounts service base URL (token endpoint lives here)
pub const DEFAULT_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Everything the catalog client needs, supplied once at startup.
#[derive(Clone)]
pub struct CatalogConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_base: String,
    pub accounts_base: String,
}

impl CatalogConfig {
    /// Config pointing at the production endpoints
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            accounts_base: DEFAULT_ACCOUNTS_BASE.to_string(),
        }
    }
}

// Credentials must never end up in logs.
impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("client_id", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("accounts_base", &self.accounts_base)
            .finish()
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the following page; `None` means this was the last one
    pub next: Option<String>,
    /// Total number of items across all pages
    pub total: u32,
}

/// An album together with the first page of its tracks.
#[derive(Debug, Clone)]
pub struct AlbumDetails {
    pub id: String,
    pub album: Arc<Album>,
    /// Number of tracks the catalog says the album has
    pub total_tracks: u32,
    pub tracks: Page<AlbumEntry>,
}

/// A track as listed on an album. Album listings omit the ISRC, so these
/// are completed into [`Track`]s once the ISRCs are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumEntry {
    pub id: Option<String>,
    pub title: String,
    pub artists: Vec<String>,
    pub track_number: u32,
    pub disc_number: u32,
}

impl AlbumEntry {
    /// Complete this entry into a track on `album`.
    pub fn into_track(self, album: Arc<Album>, isrc: Isrc) -> Track {
        Track {
            id: self.id.unwrap_or_default(),
            title: self.title,
            artists: self.artists,
            album,
            isrc,
            track_number: self.track_number,
            disc_number: self.disc_number,
        }
    }
}

/// An album in an artist's discography listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumListing {
    pub id: String,
    pub name: String,
    /// IDs of every credited album artist
    pub artist_ids: Vec<String>,
}

impl AlbumListing {
    /// Whether the given artist is credited on this album.
    pub fn credits(&self, artist_id: &str) -> bool {
        self.artist_ids.iter().any(|id| id == artist_id)
    }
}

/// Errors that can occur while talking to the catalog
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Not found in catalog: {0}")]
    NotFound(String),

    #[error("Malformed catalog response: {0}")]
    Malformed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("API request failed: HTTP {status}: {message}")]
    Api { status: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_debug_redacts_credentials() {
        let config = CatalogConfig::new("my-client-id", "my-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("my-client-id"));
        assert!(!debug.contains("my-secret"));
        assert!(debug.contains(DEFAULT_API_BASE));
    }

    #[test]
    fn test_listing_credits() {
        let listing = AlbumListing {
            id: "al1".into(),
            name: "Collab".into(),
            artist_ids: vec!["a1".into(), "a2".into()],
        };
        assert!(listing.credits("a2"));
        assert!(!listing.credits("a3"));
    }

    #[test]
    fn test_entry_into_track() {
        let album = Arc::new(crate::test_utils::mock_album());
        let entry = AlbumEntry {
            id: Some("t1".into()),
            title: "Intro".into(),
            artists: vec!["Someone".into()],
            track_number: 1,
            disc_number: 1,
        };
        let track = entry.into_track(album.clone(), Isrc::empty());
        assert_eq!(track.id, "t1");
        assert!(Arc::ptr_eq(&track.album, &album));
        assert!(track.isrc.is_empty());
    }
}
