//! Audio output: a dedicated thread owning the `rodio` stream and sink.
//!
//! The rest of the program talks to it through [`AudioPlayer`], which
//! implements [`MediaOutput`], and hears back [`AudioEvent`]s for ended or
//! failed sources.

mod player;
mod sink;
mod tap;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use tap::{SampleTap, new_tap};
pub use types::{AudioEvent, MediaOutput};
