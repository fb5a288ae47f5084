use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::error::AudioError;
use crate::library::MediaUrl;

use super::tap::{SampleTap, new_tap};
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, AudioEvent, MediaOutput, PlaybackHandle, PlaybackInfo};

/// Front end of the audio thread.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    playback: PlaybackHandle,
    tap: SampleTap,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    /// Open the default output device and start the audio thread.
    ///
    /// `on_event` is called from the audio thread for ended/failed sources.
    pub fn new<F>(volume: f32, on_event: F) -> Result<Self, AudioError>
    where
        F: Fn(AudioEvent) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));
        let tap = new_tap();

        let audio_handle = spawn_audio_thread(
            rx,
            ready_tx,
            playback_info.clone(),
            tap.clone(),
            volume,
            Box::new(on_event),
        );

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                let _ = audio_handle.join();
                return Err(err);
            }
            Err(_) => {
                let _ = audio_handle.join();
                return Err(AudioError::ThreadExited);
            }
        }

        Ok(Self {
            tx,
            playback: playback_info,
            tap,
            join: Mutex::new(Some(audio_handle)),
        })
    }

    pub fn tap(&self) -> SampleTap {
        self.tap.clone()
    }

    pub fn snapshot(&self) -> PlaybackInfo {
        self.playback
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default()
    }

    fn send(&self, cmd: AudioCmd) {
        if let Err(err) = self.tx.send(cmd) {
            warn!(cmd = ?err.0, "audio thread is gone; command dropped");
        }
    }

    /// Ask the thread to fade out and stop, then wait for it.
    pub fn quit_softly(&self, fade_out: Duration) {
        self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl MediaOutput for AudioPlayer {
    fn load(&mut self, url: MediaUrl, path: &Path) {
        if let Ok(mut info) = self.playback.lock() {
            *info = PlaybackInfo {
                url: Some(url),
                ..PlaybackInfo::default()
            };
        }
        self.send(AudioCmd::Load {
            url,
            path: path.to_path_buf(),
        });
    }

    fn unload(&mut self) {
        if let Ok(mut info) = self.playback.lock() {
            *info = PlaybackInfo::default();
        }
        self.send(AudioCmd::Unload);
    }

    fn play(&mut self) {
        self.send(AudioCmd::Play);
    }

    fn pause(&mut self) {
        self.send(AudioCmd::Pause);
    }

    fn seek(&mut self, to: Duration) {
        // Reflect the jump right away so back-to-back reads see it before the next tick.
        if let Ok(mut info) = self.playback.lock() {
            info.position = to;
        }
        self.send(AudioCmd::Seek(to));
    }

    fn position(&self) -> Duration {
        self.snapshot().position
    }

    fn duration(&self) -> Option<Duration> {
        self.snapshot().duration
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(AudioCmd::SetVolume(volume));
    }
}
