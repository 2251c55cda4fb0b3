//! Spotify Web API HTTP client
//!
//! Handles communication with the catalog REST endpoints.
//! See: https://developer.spotify.com/documentation/web-api
//!
//! Every request carries a bearer token from [`TokenCache`]. A 401 on an API
//! call drops the cached token once and retries, which covers tokens revoked
//! before their advertised expiry.

use serde::de::DeserializeOwned;

use super::auth::TokenCache;
use super::domain::{AlbumDetails, AlbumEntry, AlbumListing, CatalogConfig, CatalogError, Page};
use super::{
    ALBUM_TRACKS_PAGE_SIZE, ARTIST_ALBUMS_PAGE_SIZE, PLAYLIST_PAGE_SIZE, TRACKS_BATCH_SIZE,
    adapter, dto,
};
use crate::model::Track;

/// User agent string sent with every request
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Spotify Web API client
pub struct SpotifyClient {
    config: CatalogConfig,
    http_client: reqwest::Client,
    tokens: TokenCache,
}

impl SpotifyClient {
    /// Create a new client
    ///
    /// The client accepts gzip-compressed responses and identifies itself
    /// with the crate name and version.
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CatalogError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            tokens: TokenCache::new(),
        })
    }

    /// Look up a single track by ID
    pub async fn get_track(&self, id: &str) -> Result<Track, CatalogError> {
        let url = format!("{}/tracks/{}", self.config.api_base, id);
        let track: dto::TrackObject = self.get_json(&url).await?;
        adapter::to_required_track(track, id)
    }

    /// Return the single best match for a free-text query
    pub async fn search_track(&self, query: &str) -> Result<Track, CatalogError> {
        let response: dto::SearchResponse = self.get_json(&self.search_url(query)).await?;
        adapter::to_search_hit(response, query)
    }

    /// Fetch an album and the first page of its tracks
    pub async fn get_album(&self, id: &str) -> Result<AlbumDetails, CatalogError> {
        let url = format!("{}/albums/{}", self.config.api_base, id);
        let album: dto::AlbumObject = self.get_json(&url).await?;
        adapter::to_album_details(album, id)
    }

    /// Fetch one page of an album's tracks. `None` starts at the first page.
    pub async fn get_album_tracks_page(
        &self,
        album_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<AlbumEntry>, CatalogError> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => format!(
                "{}/albums/{}/tracks?limit={}",
                self.config.api_base, album_id, ALBUM_TRACKS_PAGE_SIZE
            ),
        };
        let page: dto::Paging<dto::SimpleTrack> = self.get_json(&url).await?;
        Ok(adapter::to_album_entries(page))
    }

    /// Fetch full track objects for up to [`TRACKS_BATCH_SIZE`] IDs
    pub async fn get_tracks(&self, ids: &[String]) -> Result<Vec<Track>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if ids.len() > TRACKS_BATCH_SIZE {
            return Err(CatalogError::Api {
                status: 400,
                message: format!("at most {} IDs per request", TRACKS_BATCH_SIZE),
            });
        }

        let url = format!("{}/tracks?ids={}", self.config.api_base, ids.join(","));
        let response: dto::SeveralTracksResponse = self.get_json(&url).await?;
        Ok(adapter::to_tracks(response))
    }

    /// Fetch one page of playlist items. `None` starts at the first page.
    pub async fn get_playlist_page(
        &self,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<Track>, CatalogError> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => format!(
                "{}/playlists/{}/tracks?limit={}",
                self.config.api_base, playlist_id, PLAYLIST_PAGE_SIZE
            ),
        };
        let page: dto::Paging<dto::PlaylistItem> = self.get_json(&url).await?;
        Ok(adapter::to_playlist_page(page))
    }

    /// Fetch one page of an artist's albums starting at `offset`
    pub async fn get_artist_albums_page(
        &self,
        artist_id: &str,
        offset: u32,
    ) -> Result<Page<AlbumListing>, CatalogError> {
        let url = format!(
            "{}/artists/{}/albums?limit={}&offset={}",
            self.config.api_base, artist_id, ARTIST_ALBUMS_PAGE_SIZE, offset
        );
        let page: dto::Paging<dto::AlbumObject> = self.get_json(&url).await?;
        Ok(adapter::to_album_listings(page))
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?q={}&type=track&limit=1",
            self.config.api_base,
            urlencoding::encode(query)
        )
    }

    /// GET a URL and decode the JSON body, retrying once on a stale token
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        match self.send_request(url).await {
            Err(CatalogError::Auth(_)) => {
                tracing::debug!("Catalog rejected token, re-authenticating");
                self.tokens.invalidate().await;
                self.send_request(url).await
            }
            other => other,
        }
    }

    /// Send the HTTP request and parse the response
    async fn send_request<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let token = self.tokens.bearer(&self.http_client, &self.config).await?;

        tracing::trace!("GET {}", url);
        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.to_string()));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(CatalogError::Auth(format!("HTTP {}", status)));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }

        if !status.is_success() {
            // Try to parse error response
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(CatalogError::Api {
                    status: error.error.status,
                    message: error.error.message,
                });
            }
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        decode(&body)
    }
}

/// Decode a response body, reporting non-JSON or mis-shaped bodies as malformed
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(120).collect();
        CatalogError::Malformed(format!("{} (body starts with {:?})", e, preview))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SpotifyClient {
        SpotifyClient::new(CatalogConfig::new("id", "secret")).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client();
        assert_eq!(client.config.api_base, "https://api.spotify.com/v1");
    }

    #[test]
    fn test_user_agent_format() {
        assert!(USER_AGENT.starts_with("spotsnake/"));
    }

    #[test]
    fn test_search_url_encodes_query() {
        let url = client().search_url("isrc:USUM71703861 & more");
        assert_eq!(
            url,
            "https://api.spotify.com/v1/search?q=isrc%3AUSUM71703861%20%26%20more&type=track&limit=1"
        );
    }

    #[test]
    fn test_decode_html_is_malformed() {
        let result: Result<dto::Paging<dto::PlaylistItem>, _> =
            decode("<html>Service Unavailable</html>");
        assert!(matches!(result, Err(CatalogError::Malformed(_))));
    }

    #[test]
    fn test_decode_wrong_shape_is_malformed() {
        let result: Result<dto::SearchResponse, _> = decode(r#"{"albums": {}}"#);
        assert!(matches!(result, Err(CatalogError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_get_tracks_rejects_oversized_batch() {
        let ids: Vec<String> = (0..51).map(|i| format!("t{}", i)).collect();
        let result = client().get_tracks(&ids).await;
        assert!(matches!(result, Err(CatalogError::Api { status: 400, .. })));
    }

    #[tokio::test]
    async fn test_get_tracks_empty_is_noop() {
        let tracks = client().get_tracks(&[]).await.unwrap();
        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_accounts_service_is_network_error() {
        let mut config = CatalogConfig::new("id", "secret");
        config.accounts_base = "http://127.0.0.1:9".to_string();
        let client = SpotifyClient::new(config).unwrap();

        let result = client.get_track("abc").await;
        assert!(matches!(result, Err(CatalogError::Network(_))));
    }
}
