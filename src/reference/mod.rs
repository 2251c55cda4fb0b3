//! Parsing user input into typed catalog references.
//!
//! Input arrives as one text blob of comma- or newline-separated entries.
//! Each entry is either a catalog link (web URL or `spotify:` URI) or free
//! text that is treated as a track search.
//!
//! ```ignore
//! let batch = parse_batch("https://open.spotify.com/album/abc?si=xyz\nsome song")?;
//! assert_eq!(batch.archive_key, "abc");
//! assert_eq!(batch.references.len(), 2);
//! ```

use std::fmt;

use crate::organizer::sanitize;

/// Host every web link is expected to point at
const WEB_HOST: &str = "open.spotify.com/";

/// URI scheme used by desktop clients
const URI_SCHEME: &str = "spotify:";

/// A typed pointer to a catalog entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Track(String),
    Album(String),
    Playlist(String),
    Artist(String),
    /// The user's saved tracks
    Liked,
    /// Free text, resolved to the best matching track
    Search(String),
}

impl Reference {
    /// The catalog ID, or the query text for searches.
    pub fn id(&self) -> &str {
        match self {
            Reference::Track(id)
            | Reference::Album(id)
            | Reference::Playlist(id)
            | Reference::Artist(id)
            | Reference::Search(id) => id,
            Reference::Liked => "liked",
        }
    }

    /// Key used to name the packaged output of a batch starting with this reference.
    pub fn archive_key(&self) -> String {
        match self {
            Reference::Search(query) => {
                let slug = sanitize(query)
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join("-");
                if slug.is_empty() {
                    "search".to_string()
                } else {
                    slug
                }
            }
            other => other.id().to_string(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Track(id) => write!(f, "track {}", id),
            Reference::Album(id) => write!(f, "album {}", id),
            Reference::Playlist(id) => write!(f, "playlist {}", id),
            Reference::Artist(id) => write!(f, "artist {}", id),
            Reference::Liked => f.write_str("liked tracks"),
            Reference::Search(query) => write!(f, "search {:?}", query),
        }
    }
}

/// A parsed batch of references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// References in input order
    pub references: Vec<Reference>,
    /// Stable name for the packaged output
    pub archive_key: String,
}

/// Errors from parsing user input
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("No links or search terms were given")]
    EmptyBatch,
}

/// Parse one line of input. Blank lines yield `None`.
pub fn parse_reference(line: &str) -> Option<Reference> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(reference) = parse_web_link(line).or_else(|| parse_uri(line)) {
        return Some(reference);
    }

    if is_liked_indicator(line) {
        return Some(Reference::Liked);
    }

    Some(Reference::Search(line.to_string()))
}

/// Parse a comma- or newline-separated blob of input.
pub fn parse_batch(input: &str) -> Result<Batch, ReferenceError> {
    let references: Vec<Reference> = input
        .split(['\n', ','])
        .filter_map(parse_reference)
        .collect();

    let archive_key = references
        .first()
        .map(Reference::archive_key)
        .ok_or(ReferenceError::EmptyBatch)?;

    Ok(Batch {
        references,
        archive_key,
    })
}

/// `https://open.spotify.com/intl-de/album/<id>?si=...`
fn parse_web_link(line: &str) -> Option<Reference> {
    let start = line.find(WEB_HOST)?;
    let mut segments = line[start + WEB_HOST.len()..]
        .split(['?', '#'])
        .next()?
        .split('/')
        .filter(|s| !s.is_empty());

    let mut kind = segments.next()?;
    if kind.starts_with("intl-") {
        kind = segments.next()?;
    }

    if kind == "collection" {
        return matches!(segments.next(), Some("tracks")).then_some(Reference::Liked);
    }

    let id = segments.next()?;
    typed(kind, id)
}

/// `spotify:track:<id>`
fn parse_uri(line: &str) -> Option<Reference> {
    let rest = line.strip_prefix(URI_SCHEME)?;
    let mut parts = rest.split(':');
    let kind = parts.next()?;
    let id = parts.next()?.split(['?', '#', '/']).next()?;
    typed(kind, id)
}

/// Catalog IDs are base62, anything else is not a link.
fn typed(kind: &str, id: &str) -> Option<Reference> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    let id = id.to_string();
    match kind {
        "track" => Some(Reference::Track(id)),
        "album" => Some(Reference::Album(id)),
        "playlist" => Some(Reference::Playlist(id)),
        "artist" => Some(Reference::Artist(id)),
        _ => None,
    }
}

fn is_liked_indicator(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower == "liked" || lower == "liked songs" || lower == "liked tracks"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_track_link() {
        let reference =
            parse_reference("https://open.spotify.com/track/795xwo6zlNZ8xgJdfFqVAz?si=254de2345f864e39");
        assert_eq!(
            reference,
            Some(Reference::Track("795xwo6zlNZ8xgJdfFqVAz".to_string()))
        );
    }

    #[test]
    fn test_parse_each_link_kind() {
        assert_eq!(
            parse_reference("http://open.spotify.com/album/abc"),
            Some(Reference::Album("abc".into()))
        );
        assert_eq!(
            parse_reference("open.spotify.com/playlist/pl1/"),
            Some(Reference::Playlist("pl1".into()))
        );
        assert_eq!(
            parse_reference("https://open.spotify.com/artist/ar1#top"),
            Some(Reference::Artist("ar1".into()))
        );
    }

    #[test]
    fn test_parse_locale_segment() {
        assert_eq!(
            parse_reference("https://open.spotify.com/intl-de/album/xyz?si=1"),
            Some(Reference::Album("xyz".into()))
        );
    }

    #[test]
    fn test_parse_uri() {
        assert_eq!(
            parse_reference("spotify:playlist:37i9dQZF1DXcBWIGoYBM5M"),
            Some(Reference::Playlist("37i9dQZF1DXcBWIGoYBM5M".into()))
        );
    }

    #[test]
    fn test_parse_uri_drops_trailing_noise() {
        assert_eq!(
            parse_reference("spotify:track:abc123?si=xyz"),
            Some(Reference::Track("abc123".into()))
        );
        assert_eq!(
            parse_reference("spotify:album:abc123#top"),
            Some(Reference::Album("abc123".into()))
        );
    }

    #[test]
    fn test_traversal_id_is_not_a_link() {
        let input = "spotify:track:../../escaped";
        assert_eq!(parse_reference(input), Some(Reference::Search(input.into())));

        let batch = parse_batch(input).unwrap();
        assert!(!batch.archive_key.contains('/'));
        assert!(!batch.archive_key.contains(".."));

        let link = "https://open.spotify.com/album/..%2F..%2Fescaped";
        assert_eq!(parse_reference(link), Some(Reference::Search(link.into())));
    }

    #[test]
    fn test_parse_liked() {
        assert_eq!(
            parse_reference("https://open.spotify.com/collection/tracks"),
            Some(Reference::Liked)
        );
        assert_eq!(parse_reference("Liked"), Some(Reference::Liked));
    }

    #[test]
    fn test_unknown_link_kind_is_a_search() {
        assert_eq!(
            parse_reference("https://open.spotify.com/show/abc"),
            Some(Reference::Search("https://open.spotify.com/show/abc".into()))
        );
    }

    #[test]
    fn test_free_text_is_search() {
        assert_eq!(
            parse_reference("  bohemian rhapsody queen "),
            Some(Reference::Search("bohemian rhapsody queen".into()))
        );
    }

    #[test]
    fn test_blank_line_is_skipped() {
        assert_eq!(parse_reference("   "), None);
    }

    #[test]
    fn test_batch_skips_empty_entries() {
        let batch = parse_batch(
            "https://open.spotify.com/track/t1?si=abc\n\n , spotify:album:a1\nsome song",
        )
        .unwrap();

        assert_eq!(
            batch.references,
            vec![
                Reference::Track("t1".into()),
                Reference::Album("a1".into()),
                Reference::Search("some song".into()),
            ]
        );
        assert_eq!(batch.archive_key, "t1");
    }

    #[test]
    fn test_archive_key_for_search() {
        let batch = parse_batch("Under Pressure: Queen?").unwrap();
        assert_eq!(batch.archive_key, "under-pressure-queen");
    }

    #[test]
    fn test_empty_batch_is_error() {
        assert!(matches!(
            parse_batch("\n , \n"),
            Err(ReferenceError::EmptyBatch)
        ));
    }
}
