//! Expands references into flat, ordered track lists.
//!
//! A [`Reference`] may name one track or thousands (an artist's whole
//! discography). The resolver walks every page the catalog hands out and
//! returns tracks in catalog order: albums sorted by disc then track number,
//! playlists in position order, artists album by album in listing order.
//!
//! Failures are scoped to the reference being expanded. [`TrackResolver::resolve_batch`]
//! keeps going when one reference fails and reports it alongside the tracks.

use std::collections::HashMap;

use crate::catalog::{
    ARTIST_ALBUMS_PAGE_SIZE, AlbumEntry, CatalogApi, CatalogError, TRACKS_BATCH_SIZE,
};
use crate::model::{Isrc, Track};
use crate::reference::Reference;

/// Why a single reference could not be expanded.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExpansionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("{0} cannot be expanded without user authorization")]
    Unsupported(String),
}

/// A reference that failed to expand
#[derive(Debug, Clone)]
pub struct ResolveFailure {
    pub reference: Reference,
    pub error: ExpansionError,
}

/// Result of expanding a batch of references.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Tracks from every reference that expanded, concatenated in input order
    pub tracks: Vec<Track>,
    pub failures: Vec<ResolveFailure>,
}

/// Expands references against a catalog.
pub struct TrackResolver<C> {
    catalog: C,
}

impl<C: CatalogApi> TrackResolver<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Expand every reference, isolating failures per reference.
    pub async fn resolve_batch(&self, references: &[Reference]) -> Resolution {
        let mut resolution = Resolution::default();

        for reference in references {
            match self.resolve(reference).await {
                Ok(tracks) => {
                    tracing::info!("{} expanded to {} track(s)", reference, tracks.len());
                    resolution.tracks.extend(tracks);
                }
                Err(error) => {
                    tracing::warn!("Could not expand {}: {}", reference, error);
                    resolution.failures.push(ResolveFailure {
                        reference: reference.clone(),
                        error,
                    });
                }
            }
        }

        resolution
    }

    /// Expand a single reference.
    pub async fn resolve(&self, reference: &Reference) -> Result<Vec<Track>, ExpansionError> {
        match reference {
            Reference::Track(id) => Ok(vec![self.catalog.get_track(id).await?]),
            Reference::Album(id) => self.expand_album(id).await,
            Reference::Playlist(id) => self.expand_playlist(id).await,
            Reference::Artist(id) => self.expand_artist(id).await,
            Reference::Search(query) => Ok(vec![self.catalog.search_track(query).await?]),
            Reference::Liked => Err(ExpansionError::Unsupported("liked tracks".to_string())),
        }
    }

    async fn expand_album(&self, id: &str) -> Result<Vec<Track>, ExpansionError> {
        let details = self.catalog.get_album(id).await?;
        let mut entries = details.tracks.items;
        let mut cursor = details.tracks.next;

        while let Some(next) = cursor {
            let page = self.catalog.get_album_tracks_page(id, Some(&next)).await?;
            entries.extend(page.items);
            cursor = page.next;
        }

        let isrcs = self.hydrate_isrcs(&entries).await;

        let mut tracks: Vec<Track> = entries
            .into_iter()
            .map(|entry| {
                let isrc = entry
                    .id
                    .as_ref()
                    .and_then(|id| isrcs.get(id))
                    .cloned()
                    .unwrap_or_default();
                entry.into_track(details.album.clone(), isrc)
            })
            .collect();

        tracks.sort_by_key(|track| (track.disc_number, track.track_number));

        if tracks.len() != details.total_tracks as usize {
            tracing::warn!(
                "Album {} lists {} tracks but {} were returned",
                details.album.name,
                details.total_tracks,
                tracks.len()
            );
        }

        Ok(tracks)
    }

    /// Album listings carry no ISRCs, so look them up in batches.
    ///
    /// A failed batch leaves its tracks with empty ISRCs; the name search
    /// still works for them.
    async fn hydrate_isrcs(&self, entries: &[AlbumEntry]) -> HashMap<String, Isrc> {
        let ids: Vec<String> = entries.iter().filter_map(|entry| entry.id.clone()).collect();
        let mut isrcs = HashMap::with_capacity(ids.len());

        for chunk in ids.chunks(TRACKS_BATCH_SIZE) {
            match self.catalog.get_tracks(chunk).await {
                Ok(tracks) => {
                    isrcs.extend(tracks.into_iter().map(|track| (track.id, track.isrc)));
                }
                Err(e) => {
                    tracing::warn!("ISRC lookup failed for {} tracks: {}", chunk.len(), e);
                }
            }
        }

        isrcs
    }

    async fn expand_playlist(&self, id: &str) -> Result<Vec<Track>, ExpansionError> {
        let mut tracks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .catalog
                .get_playlist_page(id, cursor.as_deref())
                .await?;
            tracks.extend(page.items);

            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(tracks)
    }

    async fn expand_artist(&self, id: &str) -> Result<Vec<Track>, ExpansionError> {
        let mut tracks = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.catalog.get_artist_albums_page(id, offset).await?;

            for listing in page.items {
                if !listing.credits(id) {
                    tracing::debug!("Skipping {:?}: artist {} not credited", listing.name, id);
                    continue;
                }
                tracks.extend(self.expand_album(&listing.id).await?);
            }

            offset += ARTIST_ALBUMS_PAGE_SIZE;
            if offset >= page.total {
                break;
            }
        }

        Ok(tracks)
    }
}
