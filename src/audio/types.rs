//! Audio-related small types and handles.
//!
//! This module defines the commands the audio thread accepts, the events it
//! emits, the playback snapshot it publishes and the `MediaOutput` seam the
//! transport drives.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::library::MediaUrl;

#[derive(Debug)]
pub enum AudioCmd {
    /// Open `path` as the current source, paused at 0.
    Load { url: MediaUrl, path: PathBuf },
    /// Drop the current source.
    Unload,
    /// Start or resume playback of the current source.
    Play,
    /// Pause playback.
    Pause,
    /// Jump to an absolute position in the current source.
    Seek(Duration),
    /// Output volume, `0.0..=1.0`.
    SetVolume(f32),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Things the audio thread reports back on its own.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// The source for `url` played to its end.
    Ended(MediaUrl),
    /// The source for `url` could not be opened or decoded.
    Failed { url: MediaUrl, error: String },
}

#[derive(Debug, Clone, Default)]
/// Runtime playback information shared with the UI.
pub struct PlaybackInfo {
    /// URL of the loaded source (if any).
    pub url: Option<MediaUrl>,
    /// Position inside the loaded source.
    pub position: Duration,
    /// Total length reported by the decoder, when known.
    pub duration: Option<Duration>,
    /// Whether the output is currently producing sound.
    pub playing: bool,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

/// The one media element the transport owns.
///
/// Implemented by `AudioPlayer` for real output and by test doubles.
pub trait MediaOutput {
    fn load(&mut self, url: MediaUrl, path: &Path);
    fn unload(&mut self);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, to: Duration);
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    fn set_volume(&mut self, volume: f32);
}
