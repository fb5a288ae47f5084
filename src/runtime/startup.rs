use std::path::PathBuf;
use std::sync::mpsc::Sender;

use tracing::info;

use crate::app::{App, AppEvent};
use crate::audio::AudioPlayer;
use crate::config;
use crate::error::AudioError;

/// Open the output device. Audio events are forwarded to the event loop.
pub fn open_audio(
    settings: &config::Settings,
    events: Sender<AppEvent>,
) -> Result<AudioPlayer, AudioError> {
    AudioPlayer::new(settings.audio.volume, move |event| {
        let _ = events.send(AppEvent::Audio(event));
    })
}

/// Build the model and queue the command-line paths as the first add batch.
pub fn build_app(
    player: AudioPlayer,
    settings: &config::Settings,
    inputs: Vec<PathBuf>,
) -> App<AudioPlayer> {
    let mut app = App::new(player, settings);
    if !inputs.is_empty() {
        info!(inputs = inputs.len(), "adding command-line paths");
        app.request_add(inputs);
    }
    app
}
