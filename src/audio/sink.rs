//! Utilities for creating `rodio` sinks from track files.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` at the requested start position, with the visualizer tap
//! spliced in.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::AudioError;

use super::tap::{SampleTap, TappedSource};

/// A freshly opened, paused sink plus what the decoder told us about the file.
pub(super) struct OpenedSink {
    pub sink: Sink,
    pub duration: Option<Duration>,
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
    tap: &SampleTap,
) -> Result<OpenedSink, AudioError> {
    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|source| AudioError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let duration = decoder.total_duration();

    // `skip_duration` is the fallback seeking primitive; even Duration::ZERO is fine.
    let source = TappedSource::new(decoder.skip_duration(start_at), tap.clone());

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(OpenedSink { sink, duration })
}
