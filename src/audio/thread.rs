use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, info, warn};

use crate::error::AudioError;
use crate::library::MediaUrl;

use super::sink::create_sink_at;
use super::tap::SampleTap;
use super::types::{AudioCmd, AudioEvent, PlaybackHandle, PlaybackInfo};

/// How often the thread publishes position and checks for end-of-track.
const TICK: Duration = Duration::from_millis(50);

pub(super) type EventSink = Box<dyn Fn(AudioEvent) + Send + 'static>;

/// The loaded source: the sink plus what is needed to rebuild it.
struct Loaded {
    url: MediaUrl,
    path: PathBuf,
    sink: Sink,
    /// Position the sink was opened at (rebuild-based seeking).
    offset: Duration,
    duration: Option<Duration>,
    ended_reported: bool,
}

impl Loaded {
    fn position(&self) -> Duration {
        let pos = self.offset + self.sink.get_pos();
        match self.duration {
            Some(d) => pos.min(d),
            None => pos,
        }
    }
}

/// Everything the audio thread owns.
struct Deck {
    stream: OutputStream,
    tap: SampleTap,
    playback_info: PlaybackHandle,
    on_event: EventSink,
    current: Option<Loaded>,
    playing: bool,
    volume: f32,
}

impl Deck {
    fn publish(&self) {
        if let Ok(mut info) = self.playback_info.lock() {
            match &self.current {
                Some(loaded) => {
                    info.url = Some(loaded.url);
                    info.position = loaded.position();
                    info.duration = loaded.duration;
                    info.playing = self.playing;
                }
                None => *info = PlaybackInfo::default(),
            }
        }
    }

    fn load(&mut self, url: MediaUrl, path: PathBuf) {
        self.unload();
        match create_sink_at(&self.stream, &path, Duration::ZERO, &self.tap) {
            Ok(opened) => {
                opened.sink.set_volume(self.volume);
                debug!(%url, path = %path.display(), "source loaded");
                self.current = Some(Loaded {
                    url,
                    path,
                    sink: opened.sink,
                    offset: Duration::ZERO,
                    duration: opened.duration,
                    ended_reported: false,
                });
            }
            Err(err) => self.fail(url, err),
        }
        self.publish();
    }

    fn unload(&mut self) {
        if let Some(loaded) = self.current.take() {
            loaded.sink.stop();
        }
        self.playing = false;
        if let Ok(mut ring) = self.tap.lock() {
            ring.clear();
        }
        self.publish();
    }

    fn fail(&mut self, url: MediaUrl, err: AudioError) {
        warn!(%url, error = %err, "playback source failed");
        self.current = None;
        self.playing = false;
        (self.on_event)(AudioEvent::Failed {
            url,
            error: err.to_string(),
        });
    }

    /// Replace the current sink with a fresh one opened at `at`.
    fn rebuild_at(&mut self, at: Duration) {
        let Some(loaded) = self.current.as_mut() else {
            return;
        };
        loaded.sink.stop();
        match create_sink_at(&self.stream, &loaded.path, at, &self.tap) {
            Ok(opened) => {
                opened.sink.set_volume(self.volume);
                if self.playing {
                    opened.sink.play();
                }
                loaded.sink = opened.sink;
                loaded.offset = at;
                loaded.ended_reported = false;
                if opened.duration.is_some() {
                    loaded.duration = opened.duration;
                }
            }
            Err(err) => {
                let url = loaded.url;
                self.fail(url, err);
            }
        }
    }

    fn play(&mut self) {
        let ended = match self.current.as_ref() {
            Some(loaded) => loaded.sink.empty(),
            None => return,
        };
        self.playing = true;
        if ended {
            // Played out: start over from the top.
            self.rebuild_at(Duration::ZERO);
        }
        if let Some(loaded) = self.current.as_mut() {
            loaded.sink.play();
            loaded.ended_reported = false;
        }
        self.publish();
    }

    fn pause(&mut self) {
        if let Some(loaded) = self.current.as_ref() {
            loaded.sink.pause();
        }
        self.playing = false;
        self.publish();
    }

    fn seek(&mut self, to: Duration) {
        let Some(loaded) = self.current.as_mut() else {
            return;
        };
        let to = match loaded.duration {
            Some(d) => to.min(d),
            None => to,
        };

        if !loaded.sink.empty() && loaded.sink.try_seek(to).is_ok() {
            // A successful seek resets the sink's own position to `to`.
            loaded.offset = Duration::ZERO;
            loaded.ended_reported = false;
        } else {
            self.rebuild_at(to);
        }
        self.publish();
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(loaded) = self.current.as_ref() {
            loaded.sink.set_volume(self.volume);
        }
    }

    /// Periodic check for end-of-track plus a position refresh.
    fn tick(&mut self) {
        let mut ended: Option<MediaUrl> = None;
        if let Some(loaded) = self.current.as_mut() {
            if self.playing && loaded.sink.empty() && !loaded.ended_reported {
                loaded.ended_reported = true;
                ended = Some(loaded.url);
            }
        }
        if let Some(url) = ended {
            self.playing = false;
            debug!(%url, "source ended");
            (self.on_event)(AudioEvent::Ended(url));
        }
        self.publish();
    }

    fn fade_out(&mut self, fade_out_ms: u64) {
        let Some(loaded) = self.current.as_ref() else {
            return;
        };
        if fade_out_ms == 0 || !self.playing {
            loaded.sink.set_volume(0.0);
            return;
        }
        let steps: u64 = 20;
        let step_ms = (fade_out_ms / steps).max(1);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            loaded.sink.set_volume(self.volume * (1.0 - t));
            thread::sleep(Duration::from_millis(step_ms));
        }
        loaded.sink.set_volume(0.0);
    }
}

/// Spawn the audio thread. The output device is opened on the thread itself;
/// `ready` receives the outcome before any command is processed.
pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    ready: SyncSender<Result<(), AudioError>>,
    playback_info: PlaybackHandle,
    tap: SampleTap,
    volume: f32,
    on_event: EventSink,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(err) => {
                let _ = ready.send(Err(AudioError::NoOutputDevice(err)));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));
        info!("audio output opened");

        let mut deck = Deck {
            stream,
            tap,
            playback_info,
            on_event,
            current: None,
            playing: false,
            volume: volume.clamp(0.0, 1.0),
        };

        loop {
            match rx.recv_timeout(TICK) {
                Ok(cmd) => match cmd {
                    AudioCmd::Load { url, path } => deck.load(url, path),
                    AudioCmd::Unload => deck.unload(),
                    AudioCmd::Play => deck.play(),
                    AudioCmd::Pause => deck.pause(),
                    AudioCmd::Seek(to) => deck.seek(to),
                    AudioCmd::SetVolume(v) => deck.set_volume(v),
                    AudioCmd::Quit { fade_out_ms } => {
                        deck.fade_out(fade_out_ms);
                        deck.unload();
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => deck.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!("audio thread stopped");
    })
}
