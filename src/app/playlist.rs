//! Derived playlist view: filtering, rows and stats.
//!
//! Nothing here is cached; the view is rebuilt from the store and the
//! search term on every draw.

use crate::library::{Track, TrackStore, format_clock, track_count_label};

pub const NO_TRACKS_FOUND: &str = "No tracks found";
pub const EMPTY_PLAYLIST: &str = "Drop audio files here, or press o to open a file or folder";

/// Case-insensitive substring match on the track name.
pub fn matches(track: &Track, term_lower: &str) -> bool {
    track.name.to_lowercase().contains(term_lower)
}

/// Store indices of the tracks matching `term`, in store order.
pub fn filter_indices(tracks: &[Track], term: &str) -> Vec<usize> {
    let term = term.to_lowercase();
    tracks
        .iter()
        .enumerate()
        .filter(|(_, t)| matches(t, &term))
        .map(|(i, _)| i)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistRow<'a> {
    /// Index into the store, not into the filtered list.
    pub index: usize,
    pub track: &'a Track,
    pub is_current: bool,
}

impl PlaylistRow<'_> {
    pub fn duration_label(&self) -> String {
        format_clock(self.track.duration)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistView<'a> {
    /// Nothing has been added yet.
    Empty,
    /// A search term that matches nothing.
    NoMatches,
    Rows(Vec<PlaylistRow<'a>>),
}

pub fn playlist_view<'a>(
    store: &'a TrackStore,
    term: &str,
    current: Option<usize>,
) -> PlaylistView<'a> {
    let indices = filter_indices(store.tracks(), term);
    if indices.is_empty() {
        return if term.is_empty() {
            PlaylistView::Empty
        } else {
            PlaylistView::NoMatches
        };
    }
    let rows = indices
        .into_iter()
        .filter_map(|index| {
            store.get(index).map(|track| PlaylistRow {
                index,
                track,
                is_current: current == Some(index),
            })
        })
        .collect();
    PlaylistView::Rows(rows)
}

/// Footer figures for the whole store, independent of the search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistStats {
    pub count: String,
    pub total: String,
}

pub fn stats(store: &TrackStore) -> PlaylistStats {
    PlaylistStats {
        count: track_count_label(store.len()),
        total: format_clock(Some(store.total_duration())),
    }
}
