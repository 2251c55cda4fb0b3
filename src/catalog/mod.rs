//! Streaming catalog access - fetches tracks, albums, playlists and artist
//! discographies from the Spotify Web API.
//!
//! # Architecture
//!
//! Layered so that wire formats never leak past this module:
//! - **Domain types** (`domain.rs`) - pages and listings the resolver consumes
//! - **API DTOs** (`dto.rs`) - exact API response shapes
//! - **Adapter** (`adapter.rs`) - converts DTOs to domain types
//! - **Auth** (`auth.rs`) - client-credentials token exchange and caching
//! - **Client** (`client.rs`) - HTTP client for the REST endpoints
//! - **Traits** (`traits.rs`) - the [`CatalogApi`] seam, plus test mocks
//!
//! # Usage
//!
//! ```ignore
//! let client = SpotifyClient::new(CatalogConfig::new("id", "secret"))?;
//! let track = client.get_track("795xwo6zlNZ8xgJdfFqVAz").await?;
//! ```

pub mod adapter;
pub mod auth;
pub mod client;
pub mod domain;
pub mod dto;
pub mod traits;

pub use client::SpotifyClient;
pub use domain::{AlbumDetails, AlbumEntry, AlbumListing, CatalogConfig, CatalogError, Page};
pub use traits::CatalogApi;

/// Page size used for artist album listings
pub const ARTIST_ALBUMS_PAGE_SIZE: u32 = 50;

/// Page size used for album track listings
pub const ALBUM_TRACKS_PAGE_SIZE: u32 = 50;

/// Page size used for playlist items
pub const PLAYLIST_PAGE_SIZE: u32 = 100;

/// Maximum IDs accepted by the several-tracks endpoint
pub const TRACKS_BATCH_SIZE: usize = 50;
