use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::{App, AppEvent, Focus, Phase};
use crate::audio::{AudioPlayer, MediaOutput, SampleTap};
use crate::config;
use crate::library::spawn_ingest;
use crate::metadata::spawn_metadata;
use crate::ui;
use crate::visualizer::Analyser;

/// Roughly one frame at 30 fps.
const FRAME: Duration = Duration::from_millis(33);

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    analyser: Analyser,
    tap: SampleTap,
}

impl EventLoopState {
    pub fn new(settings: &config::Settings, tap: SampleTap) -> Self {
        Self {
            pending_gg: false,
            analyser: Analyser::new(&settings.visualizer),
            tap,
        }
    }
}

/// Hand queued add batches and metadata lookups to worker threads.
fn dispatch_requests<M: MediaOutput>(
    app: &mut App<M>,
    settings: &config::Settings,
    events: &Sender<AppEvent>,
) {
    for inputs in app.take_ingest_requests() {
        let tx = events.clone();
        spawn_ingest(inputs, settings.library.clone(), move |report| {
            let _ = tx.send(AppEvent::Ingested(report));
        });
    }
    for (url, path) in app.take_metadata_requests() {
        let tx = events.clone();
        spawn_metadata(url, path, move |url, metadata| {
            let _ = tx.send(AppEvent::Metadata { url, metadata });
        });
    }
}

/// Refresh the spectrum. A paused deck feeds silence so the bars fall off.
fn update_spectrum<M: MediaOutput>(app: &mut App<M>, state: &mut EventLoopState) {
    let frame = match app.transport.phase() {
        Phase::Playing => state.analyser.analyse_tap(&state.tap),
        Phase::Paused => Some(state.analyser.analyse(&[], 1)),
        Phase::Empty => {
            state.analyser.reset();
            Some(vec![0; state.analyser.bin_count()])
        }
    };
    if let Some(bytes) = frame {
        app.spectrum = bytes;
    }
}

/// Main terminal event loop: background results, drawing and input. Returns
/// `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App<AudioPlayer>,
    events_tx: &Sender<AppEvent>,
    events_rx: &Receiver<AppEvent>,
    state: &mut EventLoopState,
) -> anyhow::Result<()> {
    loop {
        while let Ok(ev) = events_rx.try_recv() {
            app.handle_event(ev);
        }
        dispatch_requests(app, settings, events_tx);

        if settings.ui.show_visualizer {
            update_spectrum(app, state);
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;

        if event::poll(FRAME)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key_event(key, app, state) {
                        break;
                    }
                }
                Event::Paste(text) => {
                    debug!(len = text.len(), "paste received");
                    app.paste(&text);
                }
                _ => {}
            }
        }
    }

    app.media
        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
    Ok(())
}

/// Apply one key press. Returns true when the user asked to quit.
pub fn handle_key_event<M: MediaOutput>(
    key: KeyEvent,
    app: &mut App<M>,
    state: &mut EventLoopState,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.alert.is_some() {
        app.dismiss_alert();
        return false;
    }

    match app.focus {
        Focus::ConfirmClear => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => app.answer_clear(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.answer_clear(false),
                _ => {}
            }
            return false;
        }
        Focus::Search => {
            state.pending_gg = false;
            match key.code {
                KeyCode::Esc => app.exit_search(),
                KeyCode::Enter => app.commit_search(),
                KeyCode::Backspace => app.pop_search_char(),
                KeyCode::Down => app.move_selection(1),
                KeyCode::Up => app.move_selection(-1),
                KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.move_selection(1)
                }
                KeyCode::Char('k') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.move_selection(-1)
                }
                KeyCode::Char(c) if !c.is_control() => app.push_search_char(c),
                _ => {}
            }
            return false;
        }
        Focus::OpenPrompt => {
            match key.code {
                KeyCode::Esc => app.cancel_prompt(),
                KeyCode::Enter => app.submit_prompt(),
                KeyCode::Backspace => {
                    app.prompt.pop();
                }
                KeyCode::Char(c) if !c.is_control() => app.prompt.push(c),
                _ => {}
            }
            return false;
        }
        Focus::Playlist => {}
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char(' ') => app.play_pause(),
        KeyCode::Right => app.next_track(),
        KeyCode::Left => app.previous_track(),
        KeyCode::Char('/') => app.enter_search(),
        KeyCode::Esc => {
            if !app.search.is_empty() {
                app.exit_search();
            }
        }
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.select_last(),
        KeyCode::Enter => app.play_selected(),
        KeyCode::Char('s') => app.toggle_shuffle(),
        KeyCode::Char('r') => app.toggle_repeat(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_volume(true),
        KeyCode::Char('-') => app.change_volume(false),
        KeyCode::Char('L') => app.scrub(true),
        KeyCode::Char('H') => app.scrub(false),
        KeyCode::Char(c @ '0'..='9') => app.seek_tenth(c as u8 - b'0'),
        KeyCode::Char('o') => app.open_prompt(),
        KeyCode::Char('c') => app.request_clear(),
        _ => {}
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::FakeMedia;
    use crate::audio::new_tap;
    use crate::config::Settings;
    use crate::library::{IngestReport, ResolvedFile};
    use std::path::PathBuf;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup(names: &[&str]) -> (App<FakeMedia>, EventLoopState) {
        let settings = Settings::default();
        let mut app = App::new(FakeMedia::default(), &settings);
        app.on_ingested(IngestReport {
            files: names
                .iter()
                .map(|n| ResolvedFile {
                    path: PathBuf::from(format!("/m/{n}.mp3")),
                    duration: Some(Duration::from_secs(100)),
                })
                .collect(),
            ..IngestReport::default()
        });
        (app, EventLoopState::new(&settings, new_tap()))
    }

    #[test]
    fn space_and_arrows_drive_transport() {
        let (mut app, mut state) = setup(&["a", "b", "c"]);

        handle_key_event(press(KeyCode::Char(' ')), &mut app, &mut state);
        assert_eq!(app.transport.phase(), Phase::Playing);

        handle_key_event(press(KeyCode::Right), &mut app, &mut state);
        assert_eq!(app.transport.current(), Some(1));

        handle_key_event(press(KeyCode::Left), &mut app, &mut state);
        assert_eq!(app.transport.current(), Some(0));
    }

    #[test]
    fn shortcuts_are_ignored_while_typing() {
        let (mut app, mut state) = setup(&["a", "b"]);
        handle_key_event(press(KeyCode::Char('/')), &mut app, &mut state);
        assert_eq!(app.focus, Focus::Search);

        handle_key_event(press(KeyCode::Char(' ')), &mut app, &mut state);
        handle_key_event(press(KeyCode::Right), &mut app, &mut state);
        handle_key_event(press(KeyCode::Char('q')), &mut app, &mut state);
        assert_eq!(app.transport.phase(), Phase::Paused);
        assert_eq!(app.transport.current(), Some(0));
        assert_eq!(app.search, " q");

        handle_key_event(press(KeyCode::Esc), &mut app, &mut state);
        assert_eq!(app.focus, Focus::Playlist);
        assert!(app.search.is_empty());
    }

    #[test]
    fn shortcuts_are_ignored_in_open_prompt() {
        let (mut app, mut state) = setup(&["a", "b"]);
        handle_key_event(press(KeyCode::Char('o')), &mut app, &mut state);
        assert_eq!(app.focus, Focus::OpenPrompt);

        for code in [
            KeyCode::Char(' '),
            KeyCode::Right,
            KeyCode::Left,
            KeyCode::Char('q'),
        ] {
            assert!(!handle_key_event(press(code), &mut app, &mut state));
        }
        assert_eq!(app.transport.phase(), Phase::Paused);
        assert_eq!(app.transport.current(), Some(0));
        assert_eq!(app.prompt, " q");

        handle_key_event(press(KeyCode::Esc), &mut app, &mut state);
        assert_eq!(app.focus, Focus::Playlist);
        assert!(app.take_ingest_requests().is_empty());
    }

    #[test]
    fn clear_needs_confirmation() {
        let (mut app, mut state) = setup(&["a"]);
        handle_key_event(press(KeyCode::Char('c')), &mut app, &mut state);
        assert_eq!(app.focus, Focus::ConfirmClear);
        handle_key_event(press(KeyCode::Char('x')), &mut app, &mut state);
        assert_eq!(app.store.len(), 1);
        handle_key_event(press(KeyCode::Char('y')), &mut app, &mut state);
        assert!(app.store.is_empty());
        assert_eq!(app.focus, Focus::Playlist);
    }

    #[test]
    fn digit_seeks_to_tenth() {
        let (mut app, mut state) = setup(&["a"]);
        app.media.duration = Some(Duration::from_secs(100));
        handle_key_event(press(KeyCode::Char('5')), &mut app, &mut state);
        assert_eq!(app.media.position, Duration::from_secs(50));
        handle_key_event(press(KeyCode::Char('L')), &mut app, &mut state);
        assert_eq!(app.media.position, Duration::from_secs(55));
    }

    #[test]
    fn alert_swallows_next_key() {
        let (mut app, mut state) = setup(&["a"]);
        app.alert = Some("boom".into());
        assert!(!handle_key_event(press(KeyCode::Char('q')), &mut app, &mut state));
        assert!(app.alert.is_none());
        assert!(handle_key_event(press(KeyCode::Char('q')), &mut app, &mut state));
    }

    #[test]
    fn gg_and_g_jump() {
        let (mut app, mut state) = setup(&["a", "b", "c"]);
        handle_key_event(press(KeyCode::Char('G')), &mut app, &mut state);
        assert_eq!(app.selected, 2);
        handle_key_event(press(KeyCode::Char('g')), &mut app, &mut state);
        assert_eq!(app.selected, 2);
        handle_key_event(press(KeyCode::Char('g')), &mut app, &mut state);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn prompt_collects_path() {
        let (mut app, mut state) = setup(&[]);
        handle_key_event(press(KeyCode::Char('o')), &mut app, &mut state);
        for c in "/x".chars() {
            handle_key_event(press(KeyCode::Char(c)), &mut app, &mut state);
        }
        handle_key_event(press(KeyCode::Enter), &mut app, &mut state);
        assert_eq!(app.take_ingest_requests(), vec![vec![PathBuf::from("/x")]]);
    }
}
