use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::audio::{AudioEvent, MediaOutput};
use crate::config::{PlaybackSettings, Settings};
use crate::error::LibraryError;
use crate::library::{IngestReport, MediaUrl, ResolvedFile, TrackStore};
use crate::metadata::{DEFAULT_ACCENT, Rgb, TrackMetadata};

/// Media output that only records what it was told.
#[derive(Debug, Default)]
pub(crate) struct FakeMedia {
    pub loaded: Option<(MediaUrl, PathBuf)>,
    pub playing: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub volume: f32,
    pub loads: usize,
}

impl MediaOutput for FakeMedia {
    fn load(&mut self, url: MediaUrl, path: &Path) {
        self.loaded = Some((url, path.to_path_buf()));
        self.playing = false;
        self.position = Duration::ZERO;
        self.loads += 1;
    }

    fn unload(&mut self) {
        self.loaded = None;
        self.playing = false;
        self.position = Duration::ZERO;
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, to: Duration) {
        self.position = to;
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }
}

fn files(names: &[&str]) -> Vec<ResolvedFile> {
    names
        .iter()
        .map(|n| ResolvedFile {
            path: PathBuf::from(format!("/music/{n}.mp3")),
            duration: Some(Duration::from_secs(61)),
        })
        .collect()
}

fn store_of(n: usize) -> TrackStore {
    let names: Vec<String> = (0..n).map(|i| format!("track{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut store = TrackStore::new();
    store.append_batch(files(&refs));
    store
}

fn transport(shuffle: bool, repeat: bool) -> Transport {
    let settings = PlaybackSettings {
        shuffle,
        repeat,
        ..PlaybackSettings::default()
    };
    Transport::new(&settings, 1.0).with_rng(StdRng::seed_from_u64(7))
}

fn app_with(names: &[&str]) -> App<FakeMedia> {
    let mut app = App::new(FakeMedia::default(), &Settings::default())
        .with_transport(transport(false, false));
    app.on_ingested(IngestReport {
        files: files(names),
        ..IngestReport::default()
    });
    app
}

#[test]
fn load_out_of_range_is_a_no_op() {
    let store = store_of(2);
    let mut media = FakeMedia::default();
    let mut t = transport(false, false);

    assert_eq!(t.load(5, &store, &mut media), None);
    assert_eq!(t.current(), None);
    assert_eq!(t.phase(), Phase::Empty);
    assert!(media.loaded.is_none());
}

#[test]
fn load_enters_paused_and_play_needs_a_track() {
    let store = store_of(2);
    let mut media = FakeMedia::default();
    let mut t = transport(false, false);

    t.play(&mut media);
    assert_eq!(t.phase(), Phase::Empty);
    assert!(!media.playing);

    assert_eq!(t.load(1, &store, &mut media), Some(1));
    assert_eq!(t.phase(), Phase::Paused);
    assert_eq!(media.loaded.as_ref().map(|(u, _)| *u), Some(store.tracks()[1].url));

    t.play(&mut media);
    assert!(t.is_playing());
    t.pause(&mut media);
    assert_eq!(t.phase(), Phase::Paused);
    assert!(!media.playing);
}

#[test]
fn toggle_from_empty_starts_first_track() {
    let store = store_of(3);
    let mut media = FakeMedia::default();
    let mut t = transport(false, false);

    assert_eq!(t.toggle(&store, &mut media), Some(0));
    assert_eq!(t.current(), Some(0));
    assert!(t.is_playing());

    assert_eq!(t.toggle(&store, &mut media), None);
    assert_eq!(t.phase(), Phase::Paused);
}

#[test]
fn toggle_with_empty_store_stays_empty() {
    let store = TrackStore::new();
    let mut media = FakeMedia::default();
    let mut t = transport(false, false);
    assert_eq!(t.toggle(&store, &mut media), None);
    assert_eq!(t.phase(), Phase::Empty);
}

#[test]
fn next_advances_sequentially() {
    let store = store_of(3);
    let mut media = FakeMedia::default();
    let mut t = transport(false, false);
    t.load(0, &store, &mut media);

    assert_eq!(t.next(&store, &mut media), Some(1));
    assert_eq!(t.current(), Some(1));
    assert!(t.is_playing());
}

#[test]
fn next_from_nothing_loaded_starts_at_zero() {
    let store = store_of(3);
    let mut media = FakeMedia::default();
    let mut t = transport(false, false);
    assert_eq!(t.next(&store, &mut media), Some(0));
}

#[test]
fn next_at_last_without_repeat_pauses_in_place() {
    let store = store_of(3);
    let mut media = FakeMedia::default();
    let mut t = transport(false, false);
    t.load(2, &store, &mut media);
    t.play(&mut media);

    assert_eq!(t.next(&store, &mut media), None);
    assert_eq!(t.current(), Some(2));
    assert_eq!(t.phase(), Phase::Paused);
    assert!(!media.playing);
}

#[test]
fn next_at_last_with_repeat_wraps_and_plays() {
    let store = store_of(3);
    let mut media = FakeMedia::default();
    let mut t = transport(false, true);
    t.load(2, &store, &mut media);

    assert_eq!(t.next(&store, &mut media), Some(0));
    assert_eq!(t.current(), Some(0));
    assert_eq!(t.phase(), Phase::Playing);
}

#[test]
fn shuffle_never_repeats_current_track() {
    let store = store_of(4);
    let mut media = FakeMedia::default();
    let mut t = transport(true, false);
    t.load(0, &store, &mut media);

    let mut seen = [false; 4];
    for _ in 0..200 {
        let before = t.current();
        let after = t.next(&store, &mut media);
        assert!(after.is_some());
        assert_ne!(after, before);
        seen[after.unwrap()] = true;
    }
    assert!(seen.iter().all(|s| *s), "every other track gets picked eventually");
}

#[test]
fn shuffle_with_single_track_is_sequential() {
    let store = store_of(1);
    let mut media = FakeMedia::default();
    let mut t = transport(true, false);
    t.load(0, &store, &mut media);
    assert_eq!(t.next(&store, &mut media), None);
    assert_eq!(t.current(), Some(0));
}

#[test]
fn previous_after_threshold_restarts_same_track() {
    let store = store_of(3);
    let mut media = FakeMedia::default();
    let mut t = transport(false, false);
    t.load(1, &store, &mut media);
    t.play(&mut media);
    media.position = Duration::from_secs(5);
    let loads = media.loads;

    assert_eq!(t.previous(&store, &mut media), None);
    assert_eq!(t.current(), Some(1));
    assert_eq!(media.position, Duration::ZERO);
    assert_eq!(media.loads, loads);
    assert!(t.is_playing());
}

#[test]
fn previous_within_threshold_steps_back_and_wraps() {
    let store = store_of(3);
    let mut media = FakeMedia::default();
    let mut t = transport(false, false);
    t.load(1, &store, &mut media);
    media.position = Duration::from_secs(3);

    assert_eq!(t.previous(&store, &mut media), Some(0));
    assert!(t.is_playing());
    assert_eq!(t.previous(&store, &mut media), Some(2));
}

#[test]
fn previous_on_empty_store_does_nothing() {
    let store = TrackStore::new();
    let mut media = FakeMedia::default();
    let mut t = transport(false, false);
    assert_eq!(t.previous(&store, &mut media), None);
    assert_eq!(t.phase(), Phase::Empty);
}

#[test]
fn ended_with_repeat_restarts_same_track() {
    let store = store_of(3);
    let mut media = FakeMedia::default();
    let mut t = transport(false, true);
    t.load(1, &store, &mut media);
    t.play(&mut media);
    media.position = Duration::from_secs(61);

    assert_eq!(t.on_ended(&store, &mut media), None);
    assert_eq!(t.current(), Some(1));
    assert_eq!(media.position, Duration::ZERO);
    assert!(t.is_playing());
}

#[test]
fn ended_without_repeat_moves_on() {
    let store = store_of(3);
    let mut media = FakeMedia::default();
    let mut t = transport(false, false);
    t.load(0, &store, &mut media);
    t.play(&mut media);
    assert_eq!(t.on_ended(&store, &mut media), Some(1));
}

#[test]
fn seek_requires_source_and_duration() {
    let store = store_of(1);
    let mut media = FakeMedia::default();
    let mut t = transport(false, false);

    t.seek_by(10, &mut media);
    assert_eq!(media.position, Duration::ZERO);

    t.load(0, &store, &mut media);
    t.seek_to(0.5, &mut media);
    assert_eq!(media.position, Duration::ZERO);

    media.duration = Some(Duration::from_secs(100));
    t.seek_to(0.5, &mut media);
    assert_eq!(media.position, Duration::from_secs(50));

    t.seek_by(-60, &mut media);
    assert_eq!(media.position, Duration::ZERO);
    t.seek_by(500, &mut media);
    assert_eq!(media.position, Duration::from_secs(100));
}

#[test]
fn volume_is_clamped_and_labelled() {
    let mut media = FakeMedia::default();
    let mut t = transport(false, false);

    assert_eq!(t.set_volume(1.7, &mut media), 1.0);
    assert_eq!(media.volume, 1.0);
    assert_eq!(t.volume_level(), VolumeLevel::High);

    assert_eq!(t.set_volume(0.3, &mut media), 0.3);
    assert_eq!(t.volume_level().label(), "low");

    assert_eq!(t.set_volume(-2.0, &mut media), 0.0);
    assert_eq!(t.volume_level(), VolumeLevel::Mute);
    assert_eq!(VolumeLevel::of(0.5), VolumeLevel::High);
}

#[test]
fn completed_batch_loads_first_track_paused() {
    let mut app = app_with(&["b", "a"]);

    assert_eq!(app.store.len(), 2);
    assert_eq!(app.transport.current(), Some(0));
    assert_eq!(app.transport.phase(), Phase::Paused);
    assert_eq!(app.now_playing.title, "b");
    assert_eq!(app.now_playing.artist, NO_FIELD);

    let requests = app.take_metadata_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, app.store.tracks()[0].url);
    assert!(app.take_metadata_requests().is_empty());
}

#[test]
fn later_batches_append_without_reloading() {
    let mut app = app_with(&["one"]);
    app.play_pause();
    let loads = app.media.loads;

    app.on_ingested(IngestReport {
        files: files(&["two", "three"]),
        ..IngestReport::default()
    });

    let names: Vec<&str> = app.store.tracks().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["one", "two", "three"]);
    assert_eq!(app.media.loads, loads);
    assert!(app.transport.is_playing());
}

#[test]
fn folder_error_raises_alert() {
    let mut app = app_with(&[]);
    app.on_ingested(IngestReport {
        errors: vec![LibraryError::FolderAccess {
            path: PathBuf::from("/root/secret"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        }],
        ..IngestReport::default()
    });
    assert_eq!(
        app.alert.as_deref(),
        Some("Unable to access folder. Make sure you granted permission.")
    );
    assert!(app.store.is_empty());
    assert_eq!(app.transport.phase(), Phase::Empty);
}

#[test]
fn metadata_applies_only_to_loaded_track() {
    let mut app = app_with(&["a", "b"]);
    let first = app.store.tracks()[0].url;
    let second = app.store.tracks()[1].url;

    app.on_metadata(
        second,
        TrackMetadata {
            artist: "Stale".into(),
            ..TrackMetadata::default()
        },
    );
    assert_eq!(app.now_playing.artist, NO_FIELD);

    app.on_metadata(first, TrackMetadata::default());
    assert_eq!(app.now_playing.artist, "Unknown Artist");
    assert_eq!(app.now_playing.album, "Unknown Album");
    assert_eq!(app.now_playing.accent, DEFAULT_ACCENT);
}

#[test]
fn ended_event_for_other_url_is_ignored() {
    let mut app = app_with(&["a", "b"]);
    app.play_pause();
    let other = app.store.tracks()[1].url;

    app.on_audio(AudioEvent::Ended(other));
    assert_eq!(app.transport.current(), Some(0));

    let current = app.store.tracks()[0].url;
    app.on_audio(AudioEvent::Ended(current));
    assert_eq!(app.transport.current(), Some(1));
    assert_eq!(app.now_playing.title, "b");
}

#[test]
fn failed_source_pauses_with_status() {
    let mut app = app_with(&["a"]);
    app.play_pause();
    let url = app.store.tracks()[0].url;

    app.on_audio(AudioEvent::Failed {
        url,
        error: "bad header".into(),
    });
    assert_eq!(app.transport.phase(), Phase::Paused);
    assert_eq!(app.status.as_deref(), Some("Cannot play a: bad header"));
}

#[test]
fn failed_track_stays_paused_until_another_load() {
    let mut app = app_with(&["a", "b"]);
    app.play_pause();
    let url = app.store.tracks()[0].url;
    app.on_audio(AudioEvent::Failed {
        url,
        error: "bad header".into(),
    });
    // The deck drops a source it cannot decode.
    app.media.playing = false;

    app.play_pause();
    assert_eq!(app.transport.phase(), Phase::Paused);
    assert_eq!(app.transport.current(), Some(0));
    assert!(!app.media.playing);

    app.next_track();
    assert_eq!(app.transport.current(), Some(1));
    assert_eq!(app.transport.phase(), Phase::Playing);
}

#[test]
fn unmatched_search_shows_message_and_keeps_store() {
    let mut app = app_with(&["Alpha", "Beta"]);
    app.enter_search();
    for c in "zzz".chars() {
        app.push_search_char(c);
    }

    assert_eq!(playlist_view(&app.store, &app.search, None), PlaylistView::NoMatches);
    assert_eq!(NO_TRACKS_FOUND, "No tracks found");
    assert_eq!(app.store.len(), 2);

    app.exit_search();
    assert!(app.search.is_empty());
    assert_eq!(app.display_indices(), vec![0, 1]);
}

#[test]
fn search_is_case_insensitive_substring() {
    let store = {
        let mut s = TrackStore::new();
        s.append_batch(files(&["Black Sabbath - Paranoid", "Metallica - One", "blackbird"]));
        s
    };
    assert_eq!(filter_indices(store.tracks(), "BLACK"), vec![0, 2]);
    // Letters in order but not contiguous do not match.
    assert!(filter_indices(store.tracks(), "mtl").is_empty());

    match playlist_view(&store, "one", Some(1)) {
        PlaylistView::Rows(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].index, 1);
            assert!(rows[0].is_current);
            assert_eq!(rows[0].duration_label(), "1:01");
        }
        other => panic!("unexpected view {other:?}"),
    }
}

#[test]
fn empty_store_without_term_is_empty_view() {
    let store = TrackStore::new();
    assert_eq!(playlist_view(&store, "", None), PlaylistView::Empty);
}

#[test]
fn stats_count_and_total() {
    let store = store_of(3);
    let s = stats(&store);
    assert_eq!(s.count, "3 tracks");
    assert_eq!(s.total, "3:03");
    assert_eq!(stats(&store_of(1)).count, "1 track");
    assert_eq!(stats(&TrackStore::new()).total, "0:00");
}

#[test]
fn clear_empties_store_and_revokes_urls() {
    let mut app = app_with(&["a", "b", "c"]);
    app.play_pause();
    let urls: Vec<MediaUrl> = app.store.tracks().iter().map(|t| t.url).collect();

    app.request_clear();
    assert_eq!(app.focus, Focus::ConfirmClear);
    app.answer_clear(false);
    assert_eq!(app.store.len(), 3);

    app.request_clear();
    app.answer_clear(true);
    assert!(app.store.is_empty());
    assert!(urls.iter().all(|u| app.store.resolve(*u).is_none()));
    assert_eq!(app.transport.phase(), Phase::Empty);
    assert_eq!(app.transport.current(), None);
    assert!(app.media.loaded.is_none());
    assert_eq!(app.now_playing, NowPlaying::default());
    assert_eq!(app.now_playing.title, NO_TRACK_SELECTED);
}

#[test]
fn selection_wraps_within_filtered_rows() {
    let mut app = app_with(&["red", "green", "blue", "grey"]);
    app.search = "gr".into();
    app.select_first();
    assert_eq!(app.selected, 1);
    app.move_selection(1);
    assert_eq!(app.selected, 3);
    app.move_selection(1);
    assert_eq!(app.selected, 1);
    app.move_selection(-1);
    assert_eq!(app.selected, 3);

    app.play_selected();
    assert_eq!(app.transport.current(), Some(3));
    assert!(app.transport.is_playing());
}

#[test]
fn paste_goes_to_focused_field_or_becomes_a_drop() {
    let mut app = app_with(&[]);
    app.paste("'/tmp/a b.mp3' /tmp/c.flac\n");
    let batches = app.take_ingest_requests();
    assert_eq!(
        batches,
        vec![vec![PathBuf::from("/tmp/a b.mp3"), PathBuf::from("/tmp/c.flac")]]
    );
    assert_eq!(app.ingesting, 1);

    app.enter_search();
    app.paste("abc\n");
    assert_eq!(app.search, "abc");
    assert!(app.take_ingest_requests().is_empty());
}

#[test]
fn prompt_submits_one_batch() {
    let mut app = app_with(&[]);
    app.open_prompt();
    assert!(app.focus.is_text_input());
    app.prompt.push_str("/srv/music");
    app.submit_prompt();
    assert_eq!(app.focus, Focus::Playlist);
    assert_eq!(app.take_ingest_requests(), vec![vec![PathBuf::from("/srv/music")]]);
}

#[test]
fn volume_steps_through_app() {
    let mut app = app_with(&[]);
    assert_eq!(app.media.volume, 1.0);
    app.change_volume(true);
    assert_eq!(app.transport.volume(), 1.0);
    for _ in 0..25 {
        app.change_volume(false);
    }
    assert_eq!(app.transport.volume(), 0.0);
    assert_eq!(app.transport.volume_level(), VolumeLevel::Mute);
}

#[test]
fn cover_color_becomes_accent() {
    let mut app = app_with(&["a"]);
    let url = app.store.tracks()[0].url;
    let cover = crate::metadata::CoverArt {
        thumbnail: image::RgbImage::new(1, 1),
        color: Rgb::new(1, 2, 3),
    };
    app.on_metadata(
        url,
        TrackMetadata {
            artist: "Artist".into(),
            album: "Album".into(),
            cover: Some(cover),
        },
    );
    assert_eq!(app.now_playing.accent, Rgb::new(1, 2, 3));
    assert_eq!(app.now_playing.artist, "Artist");
}
