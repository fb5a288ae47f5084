//! Application model: `App`, `NowPlaying` and the events that feed them.
//!
//! `App` owns the track store, the transport and the media output, plus all
//! UI state (selection, search, prompt, popups). Background work is never
//! started from here. Instead the model queues ingest and metadata requests
//! that the runtime drains and hands to worker threads, whose results come
//! back as [`AppEvent`]s.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::audio::{AudioEvent, MediaOutput};
use crate::config::Settings;
use crate::library::{
    IngestReport, MediaUrl, TrackStore, parse_dropped_paths, track_count_label,
};
use crate::metadata::{CoverArt, DEFAULT_ACCENT, Rgb, TrackMetadata};

use super::playlist::filter_indices;
use super::transport::Transport;

pub const NO_TRACK_SELECTED: &str = "No track selected";
pub const NO_FIELD: &str = "—";

/// Results delivered to the event loop by background threads.
#[derive(Debug)]
pub enum AppEvent {
    Ingested(IngestReport),
    Metadata { url: MediaUrl, metadata: TrackMetadata },
    Audio(AudioEvent),
}

/// Where typed keys go.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Playlist,
    Search,
    OpenPrompt,
    ConfirmClear,
}

impl Focus {
    /// True while a text field owns the keyboard.
    pub fn is_text_input(self) -> bool {
        matches!(self, Self::Search | Self::OpenPrompt)
    }
}

/// What the player panel shows.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    /// URL of the loaded track; metadata for any other URL is stale.
    pub url: Option<MediaUrl>,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub cover: Option<CoverArt>,
    pub accent: Rgb,
}

impl Default for NowPlaying {
    fn default() -> Self {
        Self {
            url: None,
            title: NO_TRACK_SELECTED.to_string(),
            artist: NO_FIELD.to_string(),
            album: NO_FIELD.to_string(),
            cover: None,
            accent: DEFAULT_ACCENT,
        }
    }
}

/// Values from `Settings` the model needs at runtime.
#[derive(Debug, Clone)]
struct Steps {
    volume: f32,
    scrub_seconds: i64,
}

pub struct App<M: MediaOutput> {
    pub store: TrackStore,
    pub transport: Transport,
    pub media: M,
    pub now_playing: NowPlaying,

    /// Selected row, as a store index.
    pub selected: usize,
    pub focus: Focus,
    pub search: String,
    pub prompt: String,

    /// Modal message; any key dismisses it.
    pub alert: Option<String>,
    /// One-line status under the playlist.
    pub status: Option<String>,
    /// Latest visualizer bytes, one per frequency bin.
    pub spectrum: Vec<u8>,
    /// Add batches submitted but not yet reported back.
    pub ingesting: usize,

    steps: Steps,
    pending_ingest: Vec<Vec<PathBuf>>,
    pending_metadata: Vec<(MediaUrl, PathBuf)>,
}

impl<M: MediaOutput> App<M> {
    pub fn new(mut media: M, settings: &Settings) -> Self {
        let transport = Transport::new(&settings.playback, settings.audio.volume);
        media.set_volume(transport.volume());
        Self {
            store: TrackStore::new(),
            transport,
            media,
            now_playing: NowPlaying::default(),
            selected: 0,
            focus: Focus::Playlist,
            search: String::new(),
            prompt: String::new(),
            alert: None,
            status: None,
            spectrum: Vec::new(),
            ingesting: 0,
            steps: Steps {
                volume: settings.audio.volume_step,
                scrub_seconds: settings.controls.scrub_seconds.min(i64::MAX as u64) as i64,
            },
            pending_ingest: Vec::new(),
            pending_metadata: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Queue one add batch for the runtime.
    pub fn request_add(&mut self, paths: Vec<PathBuf>) {
        if paths.is_empty() {
            return;
        }
        self.ingesting += 1;
        self.status = Some("Reading files…".to_string());
        self.pending_ingest.push(paths);
    }

    pub fn take_ingest_requests(&mut self) -> Vec<Vec<PathBuf>> {
        std::mem::take(&mut self.pending_ingest)
    }

    pub fn take_metadata_requests(&mut self) -> Vec<(MediaUrl, PathBuf)> {
        std::mem::take(&mut self.pending_metadata)
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Ingested(report) => self.on_ingested(report),
            AppEvent::Metadata { url, metadata } => self.on_metadata(url, metadata),
            AppEvent::Audio(event) => self.on_audio(event),
        }
    }

    /// A whole add batch resolved.
    pub fn on_ingested(&mut self, report: IngestReport) {
        self.ingesting = self.ingesting.saturating_sub(1);

        if let Some(err) = report.errors.first() {
            self.alert = Some(err.user_message());
        }

        let added = self.store.append_batch(report.files);
        info!(
            added = added.len(),
            rejected = report.rejected,
            total = self.store.len(),
            "batch added"
        );
        self.status = Some(match (added.len(), report.rejected) {
            (0, 0) => "Nothing to add".to_string(),
            (0, r) => format!("No audio files found ({r} skipped)"),
            (n, 0) => format!("Added {}", track_count_label(n)),
            (n, r) => format!("Added {}, skipped {r}", track_count_label(n)),
        });

        if self.transport.current().is_none() && !self.store.is_empty() {
            let loaded = self.transport.load(0, &self.store, &mut self.media);
            self.after_load(loaded);
        }
        self.ensure_selected_visible();
    }

    /// Apply metadata if it still belongs to the loaded track.
    pub fn on_metadata(&mut self, url: MediaUrl, metadata: TrackMetadata) {
        if self.now_playing.url != Some(url) {
            return;
        }
        self.now_playing.accent = metadata.accent();
        debug!(%url, accent = %self.now_playing.accent.to_css(), "metadata applied");
        self.now_playing.artist = metadata.artist;
        self.now_playing.album = metadata.album;
        self.now_playing.cover = metadata.cover;
    }

    pub fn on_audio(&mut self, event: AudioEvent) {
        match event {
            AudioEvent::Ended(url) => {
                if self.now_playing.url != Some(url) {
                    return;
                }
                let loaded = self.transport.on_ended(&self.store, &mut self.media);
                self.after_load(loaded);
            }
            AudioEvent::Failed { url, error } => {
                if self.now_playing.url != Some(url) {
                    return;
                }
                warn!(%url, index = ?self.store.index_of(url), %error, "cannot play track");
                self.transport.on_failed();
                self.status = Some(format!("Cannot play {}: {error}", self.now_playing.title));
            }
        }
    }

    /// Refresh the panel for a freshly loaded track and ask for its metadata.
    fn after_load(&mut self, loaded: Option<usize>) {
        let Some(track) = loaded.and_then(|i| self.store.get(i)) else {
            return;
        };
        self.now_playing.url = Some(track.url);
        self.now_playing.title = track.name.clone();
        self.pending_metadata.push((track.url, track.path.clone()));
        if let Some(index) = loaded {
            if self.display_indices().contains(&index) {
                self.selected = index;
            }
        }
    }

    pub fn play_pause(&mut self) {
        let loaded = self.transport.toggle(&self.store, &mut self.media);
        self.after_load(loaded);
    }

    pub fn next_track(&mut self) {
        let loaded = self.transport.next(&self.store, &mut self.media);
        self.after_load(loaded);
    }

    pub fn previous_track(&mut self) {
        let loaded = self.transport.previous(&self.store, &mut self.media);
        self.after_load(loaded);
    }

    /// Load and play the selected row.
    pub fn play_selected(&mut self) {
        if !self.display_indices().contains(&self.selected) {
            return;
        }
        let loaded = self.transport.load(self.selected, &self.store, &mut self.media);
        self.transport.play(&mut self.media);
        self.after_load(loaded);
    }

    pub fn seek_tenth(&mut self, tenth: u8) {
        self.transport
            .seek_to(f32::from(tenth.min(9)) / 10.0, &mut self.media);
    }

    pub fn scrub(&mut self, forward: bool) {
        let secs = if forward {
            self.steps.scrub_seconds
        } else {
            -self.steps.scrub_seconds
        };
        self.transport.seek_by(secs, &mut self.media);
    }

    pub fn change_volume(&mut self, up: bool) {
        let step = if up { self.steps.volume } else { -self.steps.volume };
        let target = self.transport.volume() + step;
        self.transport.set_volume(target, &mut self.media);
    }

    pub fn toggle_shuffle(&mut self) {
        let on = self.transport.toggle_shuffle();
        self.status = Some(format!("Shuffle {}", if on { "on" } else { "off" }));
    }

    pub fn toggle_repeat(&mut self) {
        let on = self.transport.toggle_repeat();
        self.status = Some(format!("Repeat {}", if on { "on" } else { "off" }));
    }

    pub fn request_clear(&mut self) {
        if self.store.is_empty() {
            return;
        }
        self.focus = Focus::ConfirmClear;
    }

    pub fn answer_clear(&mut self, confirmed: bool) {
        self.focus = Focus::Playlist;
        if confirmed {
            self.clear();
        }
    }

    /// Revoke every URL, empty the store and return to the idle panel.
    pub fn clear(&mut self) {
        self.transport.reset(&mut self.media);
        let dropped = self.store.clear();
        info!(dropped, live_urls = self.store.live_urls(), "playlist cleared");
        self.now_playing = NowPlaying::default();
        self.selected = 0;
        self.spectrum.clear();
        self.status = Some(format!("Cleared {}", track_count_label(dropped)));
    }

    /// Store indices visible under the current search term.
    pub fn display_indices(&self) -> Vec<usize> {
        filter_indices(self.store.tracks(), &self.search)
    }

    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if !display.contains(&self.selected) {
            self.selected = display.first().copied().unwrap_or(0);
        }
    }

    /// Move the selection by `delta` rows, wrapping around the visible list.
    pub fn move_selection(&mut self, delta: isize) {
        let display = self.display_indices();
        if display.is_empty() {
            return;
        }
        let len = display.len() as isize;
        let pos = display
            .iter()
            .position(|&i| i == self.selected)
            .map_or(0, |p| p as isize);
        let next = (pos + delta).rem_euclid(len) as usize;
        self.selected = display[next];
    }

    pub fn select_first(&mut self) {
        if let Some(&first) = self.display_indices().first() {
            self.selected = first;
        }
    }

    pub fn select_last(&mut self) {
        if let Some(&last) = self.display_indices().last() {
            self.selected = last;
        }
    }

    pub fn enter_search(&mut self) {
        self.focus = Focus::Search;
    }

    /// Leave the search field and drop the term.
    pub fn exit_search(&mut self) {
        self.search.clear();
        self.focus = Focus::Playlist;
        self.ensure_selected_visible();
    }

    /// Leave the search field, keeping the filter applied.
    pub fn commit_search(&mut self) {
        self.focus = Focus::Playlist;
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
        self.ensure_selected_visible();
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
        self.ensure_selected_visible();
    }

    pub fn open_prompt(&mut self) {
        self.prompt.clear();
        self.focus = Focus::OpenPrompt;
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt.clear();
        self.focus = Focus::Playlist;
    }

    /// Submit the prompt text as one add batch.
    pub fn submit_prompt(&mut self) {
        let text = std::mem::take(&mut self.prompt);
        self.focus = Focus::Playlist;
        let paths: Vec<PathBuf> = parse_dropped_paths(&text)
            .into_iter()
            .map(expand_home)
            .collect();
        self.request_add(paths);
    }

    /// Bracketed paste: typed into the focused field, otherwise a file drop.
    pub fn paste(&mut self, text: &str) {
        match self.focus {
            Focus::Search => {
                self.search.push_str(text.trim_end_matches(['\r', '\n']));
                self.ensure_selected_visible();
            }
            Focus::OpenPrompt => self.prompt.push_str(text.trim_end_matches(['\r', '\n'])),
            Focus::ConfirmClear => {}
            Focus::Playlist => self.request_add(parse_dropped_paths(text)),
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }
}

/// Expand a leading `~` the way a shell would.
fn expand_home(path: PathBuf) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path;
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path,
    }
}
