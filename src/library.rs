//! Track store and everything that feeds it.
//!
//! Files arrive from the command line, the open prompt or a terminal drop.
//! `scan` filters them to audio and probes durations as one batch; the
//! `TrackStore` then owns the resulting tracks and their playable URLs.

mod display;
mod drop;
mod model;
mod registry;
mod scan;
mod store;

pub use display::{display_name, format_clock, track_count_label};
pub use drop::parse_dropped_paths;
pub use model::{MediaUrl, ResolvedFile, Track};
pub use registry::MediaRegistry;
pub use scan::{IngestReport, audio_mime, ingest, spawn_ingest};
pub use store::TrackStore;
