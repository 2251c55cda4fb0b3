//! Adapter layer: Convert Web API DTOs to domain models
//!
//! This is the ONLY place where catalog DTO types are converted to domain
//! types. If the API changes its response format, only this file and
//! dto.rs need to change.

use std::sync::Arc;

use super::domain::{AlbumDetails, AlbumEntry, AlbumListing, CatalogError, Page};
use super::dto;
use crate::model::{Album, Isrc, Track};

/// Convert an album object to the shared album record
pub fn to_album(album: &dto::AlbumObject) -> Album {
    Album {
        name: album.name.clone(),
        artists: artist_names(&album.artists),
        cover_url: album.images.first().map(|image| image.url.clone()),
        release_date: album.release_date.clone(),
    }
}

/// Convert a full track object.
///
/// Returns `None` for entries that can't be downloaded: local files,
/// podcast episodes, and tracks without an ID or album.
pub fn to_track(track: dto::TrackObject) -> Option<Track> {
    if track.is_local || track.kind.as_deref().is_some_and(|kind| kind != "track") {
        return None;
    }

    let id = track.id?;
    let album = Arc::new(to_album(track.album.as_ref()?));
    let isrc = track
        .external_ids
        .isrc
        .as_deref()
        .map(Isrc::parse)
        .unwrap_or_default();

    Some(Track {
        id,
        title: track.name,
        artists: artist_names(&track.artists),
        album,
        isrc,
        track_number: track.track_number.max(1),
        disc_number: track.disc_number.max(1),
    })
}

/// Convert a full track, treating an unusable payload as not found
pub fn to_required_track(track: dto::TrackObject, id: &str) -> Result<Track, CatalogError> {
    to_track(track).ok_or_else(|| CatalogError::NotFound(format!("track {}", id)))
}

/// Convert a page of playlist items, dropping removed and unplayable entries
pub fn to_playlist_page(page: dto::Paging<dto::PlaylistItem>) -> Page<Track> {
    let available = page.items.len();
    let items: Vec<Track> = page
        .items
        .into_iter()
        .filter_map(|item| item.track)
        .filter_map(to_track)
        .collect();

    if items.len() < available {
        tracing::debug!(
            "Dropped {} unavailable playlist entries",
            available - items.len()
        );
    }

    Page {
        items,
        next: page.next,
        total: page.total,
    }
}

/// Convert an album track listing page
pub fn to_album_entries(page: dto::Paging<dto::SimpleTrack>) -> Page<AlbumEntry> {
    Page {
        items: page
            .items
            .into_iter()
            .filter(|track| !track.is_local)
            .map(|track| AlbumEntry {
                id: track.id,
                title: track.name,
                artists: artist_names(&track.artists),
                track_number: track.track_number.max(1),
                disc_number: track.disc_number.max(1),
            })
            .collect(),
        next: page.next,
        total: page.total,
    }
}

/// Convert the album endpoint response
pub fn to_album_details(mut album: dto::AlbumObject, id: &str) -> Result<AlbumDetails, CatalogError> {
    let tracks = album
        .tracks
        .take()
        .ok_or_else(|| CatalogError::Malformed(format!("album {} has no track listing", id)))?;
    let tracks = to_album_entries(tracks);

    Ok(AlbumDetails {
        id: album.id.clone().unwrap_or_else(|| id.to_string()),
        total_tracks: album.total_tracks.unwrap_or(tracks.total),
        album: Arc::new(to_album(&album)),
        tracks,
    })
}

/// Convert an artist album listing page
pub fn to_album_listings(page: dto::Paging<dto::AlbumObject>) -> Page<AlbumListing> {
    Page {
        items: page
            .items
            .into_iter()
            .filter_map(|album| {
                Some(AlbumListing {
                    id: album.id?,
                    name: album.name,
                    artist_ids: album.artists.into_iter().filter_map(|a| a.id).collect(),
                })
            })
            .collect(),
        next: page.next,
        total: page.total,
    }
}

/// Pick the best search hit
pub fn to_search_hit(response: dto::SearchResponse, query: &str) -> Result<Track, CatalogError> {
    response
        .tracks
        .items
        .into_iter()
        .find_map(to_track)
        .ok_or_else(|| CatalogError::NotFound(format!("no track matches {:?}", query)))
}

/// Convert the several-tracks response, skipping unknown IDs
pub fn to_tracks(response: dto::SeveralTracksResponse) -> Vec<Track> {
    response
        .tracks
        .into_iter()
        .flatten()
        .filter_map(to_track)
        .collect()
}

fn artist_names(artists: &[dto::SimpleArtist]) -> Vec<String> {
    artists.iter().map(|artist| artist.name.clone()).collect()
}
