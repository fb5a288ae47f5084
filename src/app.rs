//! Application state: the transport state machine, the derived playlist view
//! and the `App` model that ties them to the track store and media output.

mod model;
mod playlist;
mod transport;

pub use model::{App, AppEvent, Focus, NO_FIELD, NO_TRACK_SELECTED, NowPlaying};
pub use playlist::{
    EMPTY_PLAYLIST, NO_TRACKS_FOUND, PlaylistRow, PlaylistStats, PlaylistView, filter_indices,
    playlist_view, stats,
};
pub use transport::{Phase, Transport, VolumeLevel};

#[cfg(test)]
pub(crate) mod tests;
