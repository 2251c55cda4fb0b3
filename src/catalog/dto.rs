//! Spotify Web API Data Transfer Objects
//!
//! These types match what the Web API returns. Only the fields we read are
//! declared; serde ignores the rest.
//! DO NOT use these types outside the catalog module - convert to domain types.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api

use serde::{Deserialize, Serialize};

/// Client-credentials token response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

/// Generic paging object (`items` + `next` cursor)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Full URL of the next page, null on the last page
    pub next: Option<String>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub offset: u32,
}

/// Artist as embedded in tracks and albums
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimpleArtist {
    /// Null for local files
    pub id: Option<String>,
    pub name: String,
}

/// Album image; the API lists the widest first
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

/// External identifiers of a track
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExternalIds {
    pub isrc: Option<String>,
}

/// Album object (full when fetched directly, simplified inside listings)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlbumObject {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub release_date: String,
    pub total_tracks: Option<u32>,
    /// Only present on the album endpoint
    pub tracks: Option<Paging<SimpleTrack>>,
}

/// Track as listed on an album (no album, no external IDs)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimpleTrack {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    #[serde(default)]
    pub track_number: u32,
    #[serde(default = "first_disc")]
    pub disc_number: u32,
    #[serde(default)]
    pub is_local: bool,
}

/// Full track object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackObject {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    /// Episodes and some local files have no album
    pub album: Option<AlbumObject>,
    #[serde(default)]
    pub external_ids: ExternalIds,
    #[serde(default)]
    pub track_number: u32,
    #[serde(default = "first_disc")]
    pub disc_number: u32,
    #[serde(default)]
    pub is_local: bool,
    /// "track" or "episode"
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Playlist entry; `track` is null when the item was removed
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistItem {
    pub track: Option<TrackObject>,
}

/// Search endpoint response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    pub tracks: Paging<TrackObject>,
}

/// Several-tracks endpoint response; unknown IDs come back as null
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeveralTracksResponse {
    pub tracks: Vec<Option<TrackObject>>,
}

/// Error response body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub status: u16,
    pub message: String,
}

fn first_disc() -> u32 {
    1
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================
