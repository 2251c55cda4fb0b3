//! The catalog seam.
//!
//! The resolver only talks to [`CatalogApi`], so tests can swap the HTTP
//! client for an in-memory catalog.
//!
//! ```ignore
//! async fn expand<C: CatalogApi>(catalog: &C, id: &str) -> Result<Track, CatalogError> {
//!     catalog.get_track(id).await
//! }
//! ```

use async_trait::async_trait;

use super::domain::{AlbumDetails, AlbumEntry, AlbumListing, CatalogError, Page};
use crate::model::Track;

/// Read-only access to the streaming catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn get_track(&self, id: &str) -> Result<Track, CatalogError>;

    /// Best single match for a free-text query.
    async fn search_track(&self, query: &str) -> Result<Track, CatalogError>;

    async fn get_album(&self, id: &str) -> Result<AlbumDetails, CatalogError>;

    async fn get_album_tracks_page(
        &self,
        album_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<AlbumEntry>, CatalogError>;

    /// Full track objects for at most 50 IDs; unknown IDs are skipped.
    async fn get_tracks(&self, ids: &[String]) -> Result<Vec<Track>, CatalogError>;

    async fn get_playlist_page(
        &self,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<Track>, CatalogError>;

    async fn get_artist_albums_page(
        &self,
        artist_id: &str,
        offset: u32,
    ) -> Result<Page<AlbumListing>, CatalogError>;
}

#[async_trait]
impl CatalogApi for super::client::SpotifyClient {
    async fn get_track(&self, id: &str) -> Result<Track, CatalogError> {
        self.get_track(id).await
    }

    async fn search_track(&self, query: &str) -> Result<Track, CatalogError> {
        self.search_track(query).await
    }

    async fn get_album(&self, id: &str) -> Result<AlbumDetails, CatalogError> {
        self.get_album(id).await
    }

    async fn get_album_tracks_page(
        &self,
        album_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<AlbumEntry>, CatalogError> {
        self.get_album_tracks_page(album_id, cursor).await
    }

    async fn get_tracks(&self, ids: &[String]) -> Result<Vec<Track>, CatalogError> {
        self.get_tracks(ids).await
    }

    async fn get_playlist_page(
        &self,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<Track>, CatalogError> {
        self.get_playlist_page(playlist_id, cursor).await
    }

    async fn get_artist_albums_page(
        &self,
        artist_id: &str,
        offset: u32,
    ) -> Result<Page<AlbumListing>, CatalogError> {
        self.get_artist_albums_page(artist_id, offset).await
    }
}

/// In-memory catalog for tests.
#[cfg(test)]
pub mod mocks {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::catalog::ARTIST_ALBUMS_PAGE_SIZE;
    use crate::model::Album;

    /// Fake catalog populated up front by the test.
    ///
    /// Album tracks are stored as full [`Track`]s; the album endpoint hands
    /// out the first `album_page_size` of them as entries and the rest through
    /// cursors named `"<album>#<offset>"`. Playlists are stored as explicit
    /// pages with cursors `"<playlist>#<page>"`.
    #[derive(Default)]
    pub struct FakeCatalog {
        pub tracks: HashMap<String, Track>,
        pub albums: HashMap<String, Vec<Track>>,
        pub playlists: HashMap<String, Vec<Vec<Track>>>,
        pub artist_albums: HashMap<String, Vec<AlbumListing>>,
        pub search_results: HashMap<String, Track>,
        /// Error returned by every call (takes precedence)
        pub error: Option<CatalogError>,
        /// Album IDs whose fetch fails with `NotFound`
        pub broken_albums: Vec<String>,
        /// Overrides the album's advertised track count
        pub advertised_totals: HashMap<String, u32>,
        pub album_page_size: usize,
        pub fail_hydration: bool,
        /// Playlist pages from this index on fail with `Malformed`
        pub failing_playlist_page: Option<usize>,
        pub listing_calls: AtomicUsize,
        pub playlist_calls: AtomicUsize,
        pub hydration_calls: AtomicUsize,
    }

    impl FakeCatalog {
        pub fn new() -> Self {
            Self {
                album_page_size: 50,
                ..Default::default()
            }
        }

        pub fn with_track(mut self, track: Track) -> Self {
            self.tracks.insert(track.id.clone(), track);
            self
        }

        pub fn with_album(mut self, id: &str, tracks: Vec<Track>) -> Self {
            for track in &tracks {
                self.tracks.insert(track.id.clone(), track.clone());
            }
            self.albums.insert(id.to_string(), tracks);
            self
        }

        pub fn with_playlist(mut self, id: &str, pages: Vec<Vec<Track>>) -> Self {
            self.playlists.insert(id.to_string(), pages);
            self
        }

        pub fn with_artist(mut self, id: &str, listings: Vec<AlbumListing>) -> Self {
            self.artist_albums.insert(id.to_string(), listings);
            self
        }

        pub fn with_search(mut self, query: &str, track: Track) -> Self {
            self.search_results.insert(query.to_string(), track);
            self
        }

        pub fn with_error(error: CatalogError) -> Self {
            Self {
                error: Some(error),
                ..Self::new()
            }
        }

        fn check(&self) -> Result<(), CatalogError> {
            match &self.error {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn album_entries(&self, album_id: &str, offset: usize) -> Result<Page<AlbumEntry>, CatalogError> {
            let tracks = self
                .albums
                .get(album_id)
                .ok_or_else(|| CatalogError::NotFound(format!("album {}", album_id)))?;

            let end = (offset + self.album_page_size).min(tracks.len());
            let items = tracks[offset.min(end)..end]
                .iter()
                .map(|track| AlbumEntry {
                    id: Some(track.id.clone()),
                    title: track.title.clone(),
                    artists: track.artists.clone(),
                    track_number: track.track_number,
                    disc_number: track.disc_number,
                })
                .collect();

            Ok(Page {
                items,
                next: (end < tracks.len()).then(|| format!("{}#{}", album_id, end)),
                total: tracks.len() as u32,
            })
        }
    }

    #[async_trait]
    impl CatalogApi for FakeCatalog {
        async fn get_track(&self, id: &str) -> Result<Track, CatalogError> {
            self.check()?;
            self.tracks
                .get(id)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound(format!("track {}", id)))
        }

        async fn search_track(&self, query: &str) -> Result<Track, CatalogError> {
            self.check()?;
            self.search_results
                .get(query)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound(format!("no track matches {:?}", query)))
        }

        async fn get_album(&self, id: &str) -> Result<AlbumDetails, CatalogError> {
            self.check()?;
            if self.broken_albums.iter().any(|broken| broken == id) {
                return Err(CatalogError::NotFound(format!("album {}", id)));
            }

            let tracks = self.album_entries(id, 0)?;
            let album = self
                .albums
                .get(id)
                .and_then(|tracks| tracks.first())
                .map(|track| track.album.clone())
                .unwrap_or_else(|| Arc::new(Album {
                    name: id.to_string(),
                    artists: vec![],
                    cover_url: None,
                    release_date: String::new(),
                }));

            Ok(AlbumDetails {
                id: id.to_string(),
                album,
                total_tracks: self
                    .advertised_totals
                    .get(id)
                    .copied()
                    .unwrap_or(tracks.total),
                tracks,
            })
        }

        async fn get_album_tracks_page(
            &self,
            album_id: &str,
            cursor: Option<&str>,
        ) -> Result<Page<AlbumEntry>, CatalogError> {
            self.check()?;
            let offset = cursor
                .and_then(|c| c.rsplit_once('#'))
                .and_then(|(_, offset)| offset.parse().ok())
                .unwrap_or(0);
            self.album_entries(album_id, offset)
        }

        async fn get_tracks(&self, ids: &[String]) -> Result<Vec<Track>, CatalogError> {
            self.check()?;
            self.hydration_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_hydration {
                return Err(CatalogError::RateLimited);
            }
            assert!(ids.len() <= 50, "several-tracks lookups are capped at 50");
            Ok(ids.iter().filter_map(|id| self.tracks.get(id).cloned()).collect())
        }

        async fn get_playlist_page(
            &self,
            playlist_id: &str,
            cursor: Option<&str>,
        ) -> Result<Page<Track>, CatalogError> {
            self.check()?;
            self.playlist_calls.fetch_add(1, Ordering::SeqCst);
            let pages = self
                .playlists
                .get(playlist_id)
                .ok_or_else(|| CatalogError::NotFound(format!("playlist {}", playlist_id)))?;

            let index: usize = cursor
                .and_then(|c| c.rsplit_once('#'))
                .and_then(|(_, page)| page.parse().ok())
                .unwrap_or(0);
            if self.failing_playlist_page.is_some_and(|failing| index >= failing) {
                return Err(CatalogError::Malformed(format!(
                    "playlist {} page {} is truncated",
                    playlist_id, index
                )));
            }

            Ok(Page {
                items: pages.get(index).cloned().unwrap_or_default(),
                next: (index + 1 < pages.len()).then(|| format!("{}#{}", playlist_id, index + 1)),
                total: pages.iter().map(Vec::len).sum::<usize>() as u32,
            })
        }

        async fn get_artist_albums_page(
            &self,
            artist_id: &str,
            offset: u32,
        ) -> Result<Page<AlbumListing>, CatalogError> {
            self.check()?;
            self.listing_calls.fetch_add(1, Ordering::SeqCst);
            let listings = self
                .artist_albums
                .get(artist_id)
                .ok_or_else(|| CatalogError::NotFound(format!("artist {}", artist_id)))?;

            let start = (offset as usize).min(listings.len());
            let end = (start + ARTIST_ALBUMS_PAGE_SIZE as usize).min(listings.len());

            Ok(Page {
                items: listings[start..end].to_vec(),
                next: None,
                total: listings.len() as u32,
            })
        }
    }
}
