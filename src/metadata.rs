//! Display metadata for the player panel.
//!
//! Tags and cover art are read on a short-lived worker per loaded track. A
//! missing or unreadable tag never fails the load: it falls back to the
//! `Unknown Artist` / `Unknown Album` placeholders and the default accent.

mod color;
mod loader;

pub use color::{DEFAULT_ACCENT, Rgb, average_color};
pub use loader::{
    CoverArt, THUMBNAIL_SIZE, TrackMetadata, UNKNOWN_ALBUM, UNKNOWN_ARTIST, decode_cover,
    load_metadata, spawn_metadata,
};
