use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use image::RgbImage;
use image::imageops::FilterType;
use lofty::picture::PictureType;
use lofty::prelude::{Accessor, TaggedFileExt};
use tracing::debug;

use crate::error::MetadataError;
use crate::library::MediaUrl;

use super::color::{DEFAULT_ACCENT, Rgb, average_color};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Edge length of the square cover thumbnail, in pixels.
pub const THUMBNAIL_SIZE: u32 = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct CoverArt {
    /// Downsampled cover, `THUMBNAIL_SIZE` square.
    pub thumbnail: RgbImage,
    /// Average color of the full-size cover.
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    pub artist: String,
    pub album: String,
    pub cover: Option<CoverArt>,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            cover: None,
        }
    }
}

impl TrackMetadata {
    /// Color that tints the player panel.
    pub fn accent(&self) -> Rgb {
        self.cover.as_ref().map_or(DEFAULT_ACCENT, |c| c.color)
    }
}

/// Raw fields pulled out of the tags, before any image work.
struct Tags {
    artist: Option<String>,
    album: Option<String>,
    picture: Option<Vec<u8>>,
}

fn read_tags(path: &Path) -> Result<Tags, MetadataError> {
    let tagged = lofty::read_from_path(path)?;
    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        return Ok(Tags {
            artist: None,
            album: None,
            picture: None,
        });
    };

    let non_empty = |s: String| Some(s.trim().to_string()).filter(|s| !s.is_empty());
    let picture = tag
        .get_picture_type(PictureType::CoverFront)
        .or_else(|| tag.pictures().first())
        .map(|pic| pic.data().to_vec());

    Ok(Tags {
        artist: tag.artist().map(|s| s.into_owned()).and_then(non_empty),
        album: tag.album().map(|s| s.into_owned()).and_then(non_empty),
        picture,
    })
}

/// Decode embedded cover bytes into a thumbnail plus average color.
pub fn decode_cover(bytes: &[u8]) -> Result<CoverArt, MetadataError> {
    let image = image::load_from_memory(bytes)?;
    let rgba = image.to_rgba8();
    let color = average_color(&rgba).ok_or(MetadataError::EmptyCover)?;
    let thumbnail = image
        .resize_exact(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Triangle)
        .to_rgb8();
    Ok(CoverArt { thumbnail, color })
}

/// Resolve display metadata for `path`. Never fails; see the module docs.
pub fn load_metadata(path: &Path) -> TrackMetadata {
    let tags = match read_tags(path) {
        Ok(tags) => tags,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "tags unreadable");
            return TrackMetadata::default();
        }
    };

    let cover = tags.picture.and_then(|bytes| match decode_cover(&bytes) {
        Ok(cover) => Some(cover),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "cover unusable");
            None
        }
    });

    TrackMetadata {
        artist: tags.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        album: tags.album.unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
        cover,
    }
}

/// Load metadata on a worker thread and hand it to `on_done`, tagged with
/// the URL it was requested for.
pub fn spawn_metadata<F>(url: MediaUrl, path: PathBuf, on_done: F) -> JoinHandle<()>
where
    F: FnOnce(MediaUrl, TrackMetadata) + Send + 'static,
{
    thread::spawn(move || {
        let metadata = load_metadata(&path);
        on_done(url, metadata);
    })
}
