//! A `rodio::Source` wrapper that copies decoded samples into a ring buffer
//! the visualizer reads from.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::Source;

/// Samples kept for analysis; a few FFT windows worth at any sane size.
pub const TAP_CAPACITY: usize = 16_384;

/// Most recent interleaved samples of whatever is playing.
#[derive(Debug)]
pub struct SampleRing {
    samples: VecDeque<f32>,
    capacity: usize,
    pub channels: u16,
    pub sample_rate: u32,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            channels: 2,
            sample_rate: 44_100,
        }
    }

    pub fn push(&mut self, sample: f32) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Copy out the newest `n` samples (fewer if the ring holds fewer).
    pub fn latest(&self, n: usize) -> Vec<f32> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).copied().collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

pub type SampleTap = Arc<Mutex<SampleRing>>;

pub fn new_tap() -> SampleTap {
    Arc::new(Mutex::new(SampleRing::new(TAP_CAPACITY)))
}

pub struct TappedSource<S> {
    inner: S,
    tap: SampleTap,
}

impl<S> TappedSource<S>
where
    S: Source,
{
    pub fn new(source: S, tap: SampleTap) -> Self {
        if let Ok(mut ring) = tap.lock() {
            ring.clear();
            ring.channels = source.channels();
            ring.sample_rate = source.sample_rate();
        }
        Self { inner: source, tap }
    }
}

impl<S> Iterator for TappedSource<S>
where
    S: Source,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.inner.next()?;
        // The mixer thread must never wait on the UI: a busy tap drops the sample.
        if let Ok(mut ring) = self.tap.try_lock() {
            ring.push(sample);
        }
        Some(sample)
    }
}

impl<S> Source for TappedSource<S>
where
    S: Source,
{
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), rodio::source::SeekError> {
        self.inner.try_seek(pos)
    }
}
