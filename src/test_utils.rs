//! Test utilities and fixtures for spotsnake tests.
//!
//! Mock factories for the domain types. Customize the returned values with
//! struct update syntax:
//!
//! ```ignore
//! let track = Track {
//!     isrc: Isrc::empty(),
//!     ..mock_track("Song", 3)
//! };
//! ```

use std::path::Path;
use std::sync::Arc;

use crate::model::{Album, Isrc, Track};

/// Creates a mock Album with sensible defaults.
pub fn mock_album() -> Album {
    Album {
        name: "Test Album".to_string(),
        artists: vec!["Test Artist".to_string()],
        cover_url: Some("https://i.scdn.co/image/test-cover".to_string()),
        release_date: "2020-01-31".to_string(),
    }
}

/// Creates a mock Track on [`mock_album`].
///
/// The ID is derived from the title so tests can look tracks up by name:
/// "Lost Song" becomes `idlostsong`, which is a valid base62 catalog ID.
pub fn mock_track(title: &str, track_number: u32) -> Track {
    let slug: String = title
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    Track {
        id: format!("id{}", slug),
        title: title.to_string(),
        artists: vec!["Test Artist".to_string(), "Featured Artist".to_string()],
        album: Arc::new(mock_album()),
        isrc: Isrc::parse("USUM71703861"),
        track_number,
        disc_number: 1,
    }
}

/// Creates `count` tracks numbered from 1, sharing one album.
pub fn mock_album_tracks(album_name: &str, count: u32) -> Vec<Track> {
    let album = Arc::new(Album {
        name: album_name.to_string(),
        ..mock_album()
    });
    (1..=count)
        .map(|n| Track {
            album: album.clone(),
            ..mock_track(&format!("{} {}", album_name, n), n)
        })
        .collect()
}

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, joint stereo, no CRC
const MP3_FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x64];

/// Size of one frame at that bitrate and sample rate
const MP3_FRAME_LEN: usize = 417;

/// Writes a short run of silent MP3 frames that tag libraries accept.
pub fn write_silent_mp3(path: &Path) {
    let mut data = Vec::with_capacity(MP3_FRAME_LEN * 40);
    for _ in 0..40 {
        data.extend_from_slice(&MP3_FRAME_HEADER);
        data.resize(data.len() + MP3_FRAME_LEN - MP3_FRAME_HEADER.len(), 0);
    }
    std::fs::write(path, data).expect("write silent mp3");
}
