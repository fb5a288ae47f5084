//! Play/pause/next/previous state machine over the track store.
//!
//! Every operation takes the store and the media output it drives. Those
//! that load a different track return its index so the caller can refresh
//! the now-playing panel and request metadata.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::audio::MediaOutput;
use crate::config::PlaybackSettings;
use crate::library::TrackStore;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing loaded.
    #[default]
    Empty,
    Paused,
    Playing,
}

/// Which volume glyph to show.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VolumeLevel {
    Mute,
    Low,
    High,
}

impl VolumeLevel {
    pub fn of(volume: f32) -> Self {
        if volume <= 0.0 {
            Self::Mute
        } else if volume < 0.5 {
            Self::Low
        } else {
            Self::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Mute => "mute",
            Self::Low => "low",
            Self::High => "high",
        }
    }
}

pub struct Transport {
    current: Option<usize>,
    phase: Phase,
    shuffle: bool,
    repeat: bool,
    volume: f32,
    restart_threshold: Duration,
    /// The loaded source could not be decoded; `play` stays Paused until a
    /// new load.
    failed: bool,
    rng: StdRng,
}

impl Transport {
    pub fn new(settings: &PlaybackSettings, volume: f32) -> Self {
        Self {
            current: None,
            phase: Phase::Empty,
            shuffle: settings.shuffle,
            repeat: settings.repeat,
            volume: volume.clamp(0.0, 1.0),
            restart_threshold: Duration::from_secs(settings.restart_threshold_secs),
            failed: false,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Replace the shuffle source.
    #[cfg(test)]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Make `index` the current track, paused at its start.
    ///
    /// Out-of-range indices (and URLs that no longer resolve) leave
    /// everything untouched.
    pub fn load(
        &mut self,
        index: usize,
        store: &TrackStore,
        media: &mut dyn MediaOutput,
    ) -> Option<usize> {
        let track = store.get(index)?;
        let path = store.resolve(track.url)?;
        media.load(track.url, path);
        self.current = Some(index);
        self.phase = Phase::Paused;
        self.failed = false;
        debug!(index, url = %track.url, "track loaded");
        Some(index)
    }

    pub fn play(&mut self, media: &mut dyn MediaOutput) {
        if self.current.is_none() || self.failed {
            return;
        }
        media.play();
        self.phase = Phase::Playing;
    }

    pub fn pause(&mut self, media: &mut dyn MediaOutput) {
        if self.phase != Phase::Playing {
            return;
        }
        media.pause();
        self.phase = Phase::Paused;
    }

    /// Play/pause key. From Empty it starts the first track.
    pub fn toggle(&mut self, store: &TrackStore, media: &mut dyn MediaOutput) -> Option<usize> {
        match self.phase {
            Phase::Empty => {
                let loaded = self.load(0, store, media);
                self.play(media);
                loaded
            }
            Phase::Playing => {
                self.pause(media);
                None
            }
            Phase::Paused => {
                self.play(media);
                None
            }
        }
    }

    /// Uniform pick among every index except the current one.
    fn shuffle_pick(&mut self, len: usize) -> usize {
        match self.current {
            Some(current) if current < len => {
                let pick = self.rng.random_range(0..len - 1);
                if pick >= current { pick + 1 } else { pick }
            }
            _ => self.rng.random_range(0..len),
        }
    }

    pub fn next(&mut self, store: &TrackStore, media: &mut dyn MediaOutput) -> Option<usize> {
        let len = store.len();
        if len == 0 {
            return None;
        }

        let target = if self.shuffle && len > 1 {
            self.shuffle_pick(len)
        } else {
            let next = self.current.map_or(0, |c| c + 1);
            if next < len {
                next
            } else if self.repeat {
                0
            } else {
                self.pause(media);
                return None;
            }
        };

        let loaded = self.load(target, store, media);
        self.play(media);
        loaded
    }

    /// Restart the current track once past the threshold, otherwise step back
    /// one index (wrapping to the last track) and play.
    pub fn previous(&mut self, store: &TrackStore, media: &mut dyn MediaOutput) -> Option<usize> {
        if self.current.is_some() && media.position() > self.restart_threshold {
            media.seek(Duration::ZERO);
            return None;
        }
        let len = store.len();
        if len == 0 {
            return None;
        }
        let target = match self.current {
            Some(c) if c > 0 => c - 1,
            _ => len - 1,
        };
        let loaded = self.load(target, store, media);
        self.play(media);
        loaded
    }

    /// The media source played out.
    pub fn on_ended(&mut self, store: &TrackStore, media: &mut dyn MediaOutput) -> Option<usize> {
        if self.repeat && self.current.is_some() {
            media.seek(Duration::ZERO);
            self.play(media);
            None
        } else {
            self.next(store, media)
        }
    }

    /// The media source could not be opened or decoded.
    pub fn on_failed(&mut self) {
        if self.current.is_some() {
            self.phase = Phase::Paused;
            self.failed = true;
        }
    }

    /// Drop the source and return to Empty.
    pub fn reset(&mut self, media: &mut dyn MediaOutput) {
        media.pause();
        media.unload();
        self.current = None;
        self.phase = Phase::Empty;
        self.failed = false;
    }

    /// Jump to `fraction` of the track. Needs a known duration.
    pub fn seek_to(&self, fraction: f32, media: &mut dyn MediaOutput) {
        if self.current.is_none() {
            return;
        }
        let Some(duration) = media.duration() else {
            return;
        };
        media.seek(duration.mul_f32(fraction.clamp(0.0, 1.0)));
    }

    /// Scrub by `seconds`, clamped to the start and, when known, the end.
    pub fn seek_by(&self, seconds: i64, media: &mut dyn MediaOutput) {
        if self.current.is_none() {
            return;
        }
        let position = media.position();
        let delta = Duration::from_secs(seconds.unsigned_abs());
        let mut target = if seconds < 0 {
            position.saturating_sub(delta)
        } else {
            position + delta
        };
        if let Some(duration) = media.duration() {
            target = target.min(duration);
        }
        media.seek(target);
    }

    /// Set the output volume, clamped to `0..=1`. Returns the applied value.
    pub fn set_volume(&mut self, volume: f32, media: &mut dyn MediaOutput) -> f32 {
        self.volume = volume.clamp(0.0, 1.0);
        media.set_volume(self.volume);
        self.volume
    }

    pub fn volume_level(&self) -> VolumeLevel {
        VolumeLevel::of(self.volume)
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.shuffle
    }

    pub fn toggle_repeat(&mut self) -> bool {
        self.repeat = !self.repeat;
        self.repeat
    }
}
