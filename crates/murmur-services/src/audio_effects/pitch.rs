//! Tape-style pitch shift: speed and pitch move together

use murmur_core::Clip;

use super::{ClipEffect, EffectError};
use crate::resample::{deinterleave, interleave, resample_planar};

#[derive(Debug, Clone, PartialEq)]
pub struct PitchShift {
    /// `None` leaves the clip untouched
    pub semitones: Option<i32>,
}

impl PitchShift {
    pub fn new(semitones: Option<i32>) -> Self {
        Self { semitones }
    }

    /// Rate the clip is reinterpreted at before converting back
    pub fn shifted_rate(sample_rate: u32, semitones: i32) -> u32 {
        (sample_rate as f64 * 2f64.powf(semitones as f64 / 12.0)) as u32
    }
}

impl ClipEffect for PitchShift {
    fn name(&self) -> &str { "Pitch" }

    fn apply(&self, clip: Clip) -> Result<Clip, EffectError> {
        let Some(semitones) = self.semitones else {
            return Ok(clip);
        };
        if clip.is_empty() || clip.sample_rate == 0 {
            return Ok(clip);
        }

        let shifted_rate = Self::shifted_rate(clip.sample_rate, semitones);
        let planar = deinterleave(&clip.to_f32(), clip.channels as usize);
        let resampled = resample_planar(&planar, shifted_rate, clip.sample_rate)?;

        let samples = interleave(&resampled)
            .into_iter()
            .map(|s| (s * 32768.0).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16)
            .collect();
        Ok(clip.with_samples(samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(frames: usize) -> Clip {
        let samples = (0..frames)
            .map(|i| ((i as f32 * 0.05).sin() * 12000.0) as i16)
            .collect();
        Clip::mono(samples, 44100)
    }

    #[test]
    fn test_none_is_bit_identical() {
        let clip = tone(5000);
        assert_eq!(PitchShift::new(None).apply(clip.clone()).unwrap(), clip);
    }

    #[test]
    fn test_shifted_rate_truncates() {
        assert_eq!(PitchShift::shifted_rate(44100, 2), 49500);
        assert_eq!(PitchShift::shifted_rate(44100, -1), 41624);
        assert_eq!(PitchShift::shifted_rate(44100, 12), 88200);
    }

    #[test]
    fn test_up_shortens_and_keeps_rate() {
        let out = PitchShift::new(Some(2)).apply(tone(44100)).unwrap();
        assert_eq!(out.sample_rate, 44100);
        assert_eq!(out.samples.len(), (44100.0f64 * 44100.0 / 49500.0).round() as usize);
    }

    #[test]
    fn test_down_lengthens() {
        let out = PitchShift::new(Some(-2)).apply(tone(44100)).unwrap();
        assert!(out.samples.len() > 44100);
    }

    #[test]
    fn test_stereo_keeps_channel_layout() {
        let samples: Vec<i16> = (0..8000).map(|i| if i % 2 == 0 { 8000 } else { -8000 }).collect();
        let out = PitchShift::new(Some(1)).apply(Clip::new(samples, 44100, 2)).unwrap();
        assert_eq!(out.channels, 2);
        assert_eq!(out.samples.len() % 2, 0);
    }

    #[test]
    fn test_empty_clip_passes_through() {
        let empty = Clip::mono(vec![], 44100);
        assert!(PitchShift::new(Some(-2)).apply(empty).unwrap().is_empty());
    }
}
