use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::audio::SampleTap;
use crate::config::VisualizerSettings;

/// Frequency analyser with time smoothing and a fixed dB window.
///
/// Each call to [`Analyser::analyse`] takes the newest `fft_size` frames,
/// downmixes them to mono, applies a Blackman window, transforms, blends the
/// magnitudes with the previous frame and maps `min_db..=max_db` onto
/// `0..=255`.
pub struct Analyser {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    window: Vec<f32>,
    smoothed: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    smoothing: f32,
    min_db: f32,
    max_db: f32,
}

fn blackman(n: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;
    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            A0 - A1 * (2.0 * PI * x).cos() + A2 * (4.0 * PI * x).cos()
        })
        .collect()
}

impl Analyser {
    pub fn new(settings: &VisualizerSettings) -> Self {
        let fft_size = settings.fft_size.max(2);
        let fft = FftPlanner::<f32>::new().plan_fft_forward(fft_size);
        Self {
            fft,
            fft_size,
            window: blackman(fft_size),
            smoothed: vec![0.0; fft_size / 2],
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            smoothing: settings.smoothing.clamp(0.0, 1.0),
            min_db: settings.min_db,
            max_db: settings.max_db,
        }
    }

    /// Number of frequency bins, half the FFT size.
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Forget the smoothing history.
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Analyse interleaved samples. Fewer than `fft_size` frames are padded
    /// with leading silence, so an empty slice lets the bars fall off.
    pub fn analyse(&mut self, interleaved: &[f32], channels: u16) -> Vec<u8> {
        let channels = usize::from(channels.max(1));
        let frames = interleaved.len() / channels;
        let used = frames.min(self.fft_size);
        let pad = self.fft_size - used;
        let first = frames - used;

        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let mono = if i < pad {
                0.0
            } else {
                let frame = first + i - pad;
                let start = frame * channels;
                interleaved[start..start + channels].iter().sum::<f32>() / channels as f32
            };
            *slot = Complex::new(mono * self.window[i], 0.0);
        }

        self.fft.process(&mut self.scratch);

        let scale = 1.0 / self.fft_size as f32;
        let range = self.max_db - self.min_db;
        let tau = self.smoothing;
        self.smoothed
            .iter_mut()
            .zip(&self.scratch)
            .map(|(prev, bin)| {
                let magnitude = bin.norm() * scale;
                *prev = tau * *prev + (1.0 - tau) * magnitude;
                let db = if *prev > 0.0 {
                    20.0 * prev.log10()
                } else {
                    f32::NEG_INFINITY
                };
                let byte = (255.0 / range * (db - self.min_db)).floor();
                byte.clamp(0.0, 255.0) as u8
            })
            .collect()
    }

    /// Analyse whatever the tap currently holds; `None` while it is busy.
    pub fn analyse_tap(&mut self, tap: &SampleTap) -> Option<Vec<u8>> {
        let (samples, channels) = {
            let ring = tap.try_lock().ok()?;
            let channels = ring.channels.max(1);
            (ring.latest(self.fft_size * usize::from(channels)), channels)
        };
        Some(self.analyse(&samples, channels))
    }
}
