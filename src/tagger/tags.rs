//! The fixed tag schema and the lofty writer for it.

use std::path::Path;

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::picture::{Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, ItemValue, Tag, TagExt, TagItem, TagType};

use super::TaggingError;
use super::cover::CoverImage;
use crate::model::Track;

/// Description stored with the embedded front cover
const COVER_DESCRIPTION: &str = "Cover";

/// ID3v2.4 separator between values of one text frame
const ID3V2_VALUE_SEPARATOR: &str = "\0";

/// Every tag written for a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    pub title: String,
    /// Track artists, lead first
    pub artists: Vec<String>,
    pub album_artists: Vec<String>,
    pub album: String,
    pub recording_date: String,
    pub track_number: u32,
    pub cover: Option<CoverImage>,
}

impl TagSet {
    /// Build the tag set for a track, rejecting tracks that can't be tagged
    /// meaningfully.
    pub fn for_track(track: &Track, cover: Option<CoverImage>) -> Result<Self, TaggingError> {
        if track.title.trim().is_empty() {
            return Err(TaggingError::InvalidTags("title is empty".to_string()));
        }
        if track.track_number == 0 {
            return Err(TaggingError::InvalidTags(
                "track number must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            title: track.title.clone(),
            artists: track.artists.clone(),
            album_artists: track.album.artists.clone(),
            album: track.album.name.clone(),
            recording_date: track.album.release_date.clone(),
            track_number: track.track_number,
            cover,
        })
    }

    /// Write the tags to the audio file at `path`, replacing any earlier
    /// values for the same fields.
    pub fn write_to(&self, path: &Path) -> Result<(), TaggingError> {
        let mut tagged_file = Probe::open(path)
            .and_then(|reader| reader.read())
            .map_err(|e| TaggingError::Container(format!("{}: {}", path.display(), e)))?;

        let tag_type = tagged_file.primary_tag_type();
        if tagged_file.tag(tag_type).is_none() {
            tagged_file.insert_tag(Tag::new(tag_type));
        }
        let tag = tagged_file
            .tag_mut(tag_type)
            .ok_or_else(|| TaggingError::Container(format!("no {:?} tag", tag_type)))?;

        self.apply(tag);

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| TaggingError::Write(format!("{}: {}", path.display(), e)))
    }

    fn apply(&self, tag: &mut Tag) {
        tag.set_title(self.title.clone());
        tag.set_album(self.album.clone());
        tag.set_track(self.track_number);

        set_names(tag, ItemKey::TrackArtist, &self.artists);
        set_names(tag, ItemKey::AlbumArtist, &self.album_artists);

        if !self.recording_date.is_empty() {
            tag.insert_text(ItemKey::RecordingDate, self.recording_date.clone());
        }

        if let Some(cover) = &self.cover {
            tag.remove_picture_type(PictureType::CoverFront);
            tag.push_picture(Picture::new_unchecked(
                PictureType::CoverFront,
                Some(cover.mime.clone()),
                Some(COVER_DESCRIPTION.to_string()),
                cover.data.clone(),
            ));
        }
    }
}

/// Replace every value of `key` with `names`.
///
/// ID3v2 allows one frame per text field, so the names share a single
/// null-separated item there. Other tag formats take one item per name.
fn set_names(tag: &mut Tag, key: ItemKey, names: &[String]) {
    tag.retain(|item| item.key() != &key);
    if names.is_empty() {
        return;
    }

    if tag.tag_type() == TagType::Id3v2 {
        tag.push(TagItem::new(
            key,
            ItemValue::Text(names.join(ID3V2_VALUE_SEPARATOR)),
        ));
    } else {
        for name in names {
            tag.push(TagItem::new(key.clone(), ItemValue::Text(name.clone())));
        }
    }
}
