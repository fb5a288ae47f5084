//! Session registry of playable URLs.
//!
//! Every accepted file gets a `MediaUrl` that resolves to its path until the
//! URL is revoked. Playback only ever opens files through a live URL.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::model::MediaUrl;

#[derive(Debug, Default)]
pub struct MediaRegistry {
    next_id: u64,
    live: HashMap<MediaUrl, PathBuf>,
}

impl MediaRegistry {
    /// Issue a fresh URL for `path`.
    pub fn create(&mut self, path: &Path) -> MediaUrl {
        let url = MediaUrl(self.next_id);
        self.next_id += 1;
        self.live.insert(url, path.to_path_buf());
        url
    }

    /// Release `url`. Returns false if it was not live.
    pub fn revoke(&mut self, url: MediaUrl) -> bool {
        self.live.remove(&url).is_some()
    }

    pub fn resolve(&self, url: MediaUrl) -> Option<&Path> {
        self.live.get(&url).map(PathBuf::as_path)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
