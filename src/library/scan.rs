use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use lofty::prelude::AudioFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::LibraryError;

use super::model::ResolvedFile;

/// Outcome of one add operation: the accepted files (durations resolved, in
/// submission order) plus whatever went wrong along the way.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub files: Vec<ResolvedFile>,
    pub errors: Vec<LibraryError>,
    /// Files that were looked at and turned away as non-audio.
    pub rejected: usize,
}

/// `audio/*` MIME type for a known audio extension.
fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        "mp3" | "mpga" => "audio/mpeg",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "m4a" | "mp4a" => "audio/mp4",
        "aac" => "audio/aac",
        "aif" | "aiff" => "audio/aiff",
        "caf" => "audio/x-caf",
        "wma" => "audio/x-ms-wma",
        "mid" | "midi" => "audio/midi",
        _ => return None,
    };
    Some(mime)
}

/// Return the `audio/*` MIME type of `path` when its extension is both
/// configured and known to be audio.
pub fn audio_mime(path: &Path, settings: &LibrarySettings) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let configured = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.'))
        .any(|e| e.eq_ignore_ascii_case(&ext));
    if !configured {
        return None;
    }
    mime_for_extension(&ext)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// List the audio files in `dir`.
///
/// Only the folder itself is listed unless `settings.recursive` is set. Failing
/// to open `dir` aborts with [`LibraryError::FolderAccess`]; unreadable
/// entries below it are skipped.
fn read_folder(
    dir: &Path,
    settings: &LibrarySettings,
    rejected: &mut usize,
) -> Result<Vec<PathBuf>, LibraryError> {
    fs::read_dir(dir).map_err(|source| LibraryError::FolderAccess {
        path: dir.to_path_buf(),
        source,
    })?;

    let depth = if settings.recursive {
        settings.max_depth.unwrap_or(usize::MAX)
    } else {
        1
    };

    let walker = WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .max_depth(depth)
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(folder = %dir.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() && !entry.path().is_file() {
            continue;
        }
        if audio_mime(entry.path(), settings).is_some() {
            files.push(entry.into_path());
        } else {
            *rejected += 1;
        }
    }
    Ok(files)
}

/// Expand user inputs (files and folders) into candidate audio files, keeping
/// submission order.
pub fn collect_audio_files(
    inputs: &[PathBuf],
    settings: &LibrarySettings,
) -> (Vec<PathBuf>, Vec<LibraryError>, usize) {
    let mut files = Vec::new();
    let mut errors = Vec::new();
    let mut rejected = 0;

    for input in inputs {
        match fs::metadata(input) {
            Ok(meta) if meta.is_dir() => match read_folder(input, settings, &mut rejected) {
                Ok(found) => files.extend(found),
                Err(err) => {
                    warn!(error = %err, "folder read aborted");
                    errors.push(err);
                }
            },
            Ok(_) => {
                if audio_mime(input, settings).is_some() {
                    files.push(input.clone());
                } else {
                    rejected += 1;
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                errors.push(LibraryError::NotFound(input.clone()));
            }
            Err(source) => errors.push(LibraryError::FolderAccess {
                path: input.clone(),
                source,
            }),
        }
    }

    (files, errors, rejected)
}

/// Read the playing time of `path` from its container headers.
pub fn probe_duration(path: &Path) -> Option<Duration> {
    match lofty::read_from_path(path) {
        Ok(tagged) => Some(tagged.properties().duration()).filter(|d| !d.is_zero()),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "duration probe failed");
            None
        }
    }
}

/// Probe every file's duration in parallel and return them in input order.
///
/// A probe that fails (or panics) yields an unknown duration; it never holds
/// the batch back.
pub fn resolve_durations(files: Vec<PathBuf>) -> Vec<ResolvedFile> {
    if files.is_empty() {
        return Vec::new();
    }

    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .min(files.len());
    let chunk = files.len().div_ceil(workers);

    let durations: Vec<Option<Duration>> = thread::scope(|s| {
        let handles: Vec<_> = files
            .chunks(chunk)
            .map(|part| {
                let len = part.len();
                let handle = s.spawn(move || {
                    part.iter()
                        .map(|p| probe_duration(p))
                        .collect::<Vec<_>>()
                });
                (len, handle)
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|(len, h)| h.join().unwrap_or_else(|_| vec![None; len]))
            .collect()
    });

    files
        .into_iter()
        .zip(durations)
        .map(|(path, duration)| ResolvedFile { path, duration })
        .collect()
}

/// Run one add operation synchronously.
pub fn ingest(inputs: &[PathBuf], settings: &LibrarySettings) -> IngestReport {
    let (files, errors, rejected) = collect_audio_files(inputs, settings);
    let files = resolve_durations(files);
    info!(
        accepted = files.len(),
        rejected,
        errors = errors.len(),
        "ingest batch resolved"
    );
    IngestReport {
        files,
        errors,
        rejected,
    }
}

/// Run one add operation on a worker thread and hand the report to `on_done`
/// once, after every file in the batch has resolved.
pub fn spawn_ingest<F>(
    inputs: Vec<PathBuf>,
    settings: LibrarySettings,
    on_done: F,
) -> JoinHandle<()>
where
    F: FnOnce(IngestReport) + Send + 'static,
{
    thread::spawn(move || {
        let report = ingest(&inputs, &settings);
        on_done(report);
    })
}
