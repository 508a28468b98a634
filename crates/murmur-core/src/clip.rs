//! Decoded audio handed between codec, effects and playback

use std::time::Duration;

/// Interleaved 16-bit audio with its format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Clip {
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Self {
        Self { samples, sample_rate, channels }
    }

    pub fn mono(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self::new(samples, sample_rate, 1)
    }

    /// Same format, different samples
    pub fn with_samples(&self, samples: Vec<i16>) -> Self {
        Self::new(samples, self.sample_rate, self.channels)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Number of interleaved samples spanning `ms` milliseconds
    pub fn samples_for_ms(&self, ms: u32) -> usize {
        let frames = self.sample_rate as u64 * ms as u64 / 1000;
        frames as usize * self.channels.max(1) as usize
    }

    /// Samples as f32 in [-1.0, 1.0)
    pub fn to_f32(&self) -> Vec<f32> {
        self.samples.iter().map(|&s| s as f32 / 32768.0).collect()
    }
}
