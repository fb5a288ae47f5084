use std::ops::Range;
use std::path::Path;
use std::time::Duration;

use tracing::debug;

use super::display::display_name;
use super::model::{MediaUrl, ResolvedFile, Track};
use super::registry::MediaRegistry;

/// Ordered collection of the session's tracks.
///
/// Owns the [`MediaRegistry`], so every track's URL lives exactly as long as
/// the track does.
#[derive(Debug, Default)]
pub struct TrackStore {
    tracks: Vec<Track>,
    registry: MediaRegistry,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one completed batch in order, issuing a URL per file.
    ///
    /// Returns the index range of the new tracks.
    pub fn append_batch(&mut self, batch: Vec<ResolvedFile>) -> Range<usize> {
        let start = self.tracks.len();
        for file in batch {
            let url = self.registry.create(&file.path);
            let name = display_name(&file.path);
            self.tracks.push(Track {
                path: file.path,
                url,
                name,
                duration: file.duration,
            });
        }
        let added = start..self.tracks.len();
        debug!(added = added.len(), total = self.tracks.len(), "batch appended");
        added
    }

    /// Revoke every URL and empty the store. Returns how many tracks were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.tracks.len();
        for track in self.tracks.drain(..) {
            self.registry.revoke(track.url);
        }
        debug!(dropped, "store cleared");
        dropped
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Resolve a playable URL to its file, if still live.
    pub fn resolve(&self, url: MediaUrl) -> Option<&Path> {
        self.registry.resolve(url)
    }

    pub fn index_of(&self, url: MediaUrl) -> Option<usize> {
        self.tracks.iter().position(|t| t.url == url)
    }

    /// Sum of all known track durations.
    pub fn total_duration(&self) -> Duration {
        self.tracks.iter().filter_map(|t| t.duration).sum()
    }

    pub fn live_urls(&self) -> usize {
        self.registry.live_count()
    }
}
