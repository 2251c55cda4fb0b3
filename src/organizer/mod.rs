//! Output layout for downloaded tracks.
//!
//! Every track lands at `<root>/<album>/<title>.mp3`, where both path
//! components are passed through [`sanitize`]. The layout is flat per album so
//! concurrent downloads never write to the same file.

use std::path::{Path, PathBuf};

use crate::model::Track;

/// Characters stripped from path components
const ILLEGAL_CHARS: [char; 10] = ['*', '"', '/', '\\', '<', '>', ':', '|', '?', '.'];

/// Used when a name sanitizes down to nothing
const FALLBACK_COMPONENT: &str = "unknown";

/// Extension produced by the audio source
pub const AUDIO_EXTENSION: &str = "mp3";

/// Lower-cases a name and removes characters that are illegal in file names.
pub fn sanitize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c))
        .collect()
}

/// Destination for a track, without extension.
pub fn destination_for(root: &Path, track: &Track) -> PathBuf {
    root.join(component(&track.album.name))
        .join(component(&track.title))
}

/// The audio file the source writes for a destination.
pub fn audio_path(destination: &Path) -> PathBuf {
    // Sanitized components never contain '.', so this only appends.
    destination.with_extension(AUDIO_EXTENSION)
}

fn component(name: &str) -> String {
    let sanitized = sanitize(name);
    if sanitized.trim().is_empty() {
        FALLBACK_COMPONENT.to_string()
    } else {
        sanitized
    }
}
