//! Album cover download.

use lofty::picture::MimeType;

use super::TaggingError;

/// A downloaded cover image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub data: Vec<u8>,
    pub mime: MimeType,
}

impl CoverImage {
    /// Wrap raw image bytes, sniffing the format from the magic bytes.
    ///
    /// Covers are labelled PNG unless the data is recognizably JPEG.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let mime = if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            MimeType::Jpeg
        } else {
            MimeType::Png
        };
        Self { data, mime }
    }
}

/// Plain HTTP client for cover images
pub struct CoverClient {
    http_client: reqwest::Client,
}

impl CoverClient {
    pub fn new() -> Result<Self, TaggingError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TaggingError::Cover(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http_client })
    }

    /// Download the image at `url`
    pub async fn fetch(&self, url: &str) -> Result<CoverImage, TaggingError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| TaggingError::Cover(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaggingError::Cover(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| TaggingError::Cover(e.to_string()))?
            .to_vec();

        if data.is_empty() {
            return Err(TaggingError::Cover(format!("empty image at {}", url)));
        }

        Ok(CoverImage::from_bytes(data))
    }
}
