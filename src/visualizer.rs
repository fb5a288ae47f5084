//! Spectrum bars fed by the audio tap.
//!
//! [`Analyser`] turns the newest tapped samples into byte magnitudes per
//! frequency bin; [`bar_layout`] places them as bars for one frame.

mod analyser;
mod bars;

pub use analyser::Analyser;
pub use bars::{Bar, GRADIENT_BOTTOM, GRADIENT_TOP, bar_layout, gradient_color};
