//! Sample-domain effects on 16-bit clips

use fundsp::hacker::db_amp;
use murmur_core::Clip;

use super::{ClipEffect, EffectError};

/// Scale by `gain_db`, saturating at the 16-bit range
pub fn apply_gain(samples: &[i16], gain_db: f32) -> Vec<i16> {
    let factor = db_amp(gain_db);
    samples.iter().map(|&s| saturate(s as f32 * factor)).collect()
}

/// Mix `overlay` into `base` starting `offset` samples in.
/// The result keeps the length of `base`.
pub fn overlay(base: &[i16], overlay: &[i16], offset: usize) -> Vec<i16> {
    let mut mixed = base.to_vec();
    if let Some(tail) = mixed.get_mut(offset..) {
        for (out, &over) in tail.iter_mut().zip(overlay) {
            *out = out.saturating_add(over);
        }
    }
    mixed
}

fn saturate(value: f32) -> i16 {
    value.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Push into saturation, then pull back half the boost
#[derive(Debug, Clone, PartialEq)]
pub struct Distortion {
    pub gain_db: f32,
}

impl ClipEffect for Distortion {
    fn name(&self) -> &str { "Distortion" }

    fn apply(&self, clip: Clip) -> Result<Clip, EffectError> {
        let boosted = apply_gain(&clip.samples, self.gain_db);
        Ok(clip.with_samples(apply_gain(&boosted, -self.gain_db / 2.0)))
    }
}

/// Hard clip at a symmetric limit
#[derive(Debug, Clone, PartialEq)]
pub struct Fuzz {
    pub limit: i16,
}

impl Default for Fuzz {
    fn default() -> Self {
        Self { limit: 10_000 }
    }
}

impl ClipEffect for Fuzz {
    fn name(&self) -> &str { "Fuzz" }

    fn apply(&self, clip: Clip) -> Result<Clip, EffectError> {
        let limit = self.limit.unsigned_abs().min(i16::MAX as u16) as i16;
        let samples = clip.samples.iter().map(|s| (*s).clamp(-limit, limit)).collect();
        Ok(clip.with_samples(samples))
    }
}

/// Single attenuated repeat mixed in after `delay_ms`
#[derive(Debug, Clone, PartialEq)]
pub struct Echo {
    pub delay_ms: u32,
    pub attenuation_db: f32,
}

impl Echo {
    pub fn new(delay_ms: u32) -> Self {
        Self { delay_ms, attenuation_db: -10.0 }
    }
}

impl ClipEffect for Echo {
    fn name(&self) -> &str { "Echo" }

    fn apply(&self, clip: Clip) -> Result<Clip, EffectError> {
        let repeat = apply_gain(&clip.samples, self.attenuation_db);
        let offset = clip.samples_for_ms(self.delay_ms);
        Ok(clip.with_samples(overlay(&clip.samples, &repeat, offset)))
    }
}

/// The clip mixed with itself a few milliseconds late
#[derive(Debug, Clone, PartialEq)]
pub struct Flanger {
    pub delay_ms: u32,
}

impl ClipEffect for Flanger {
    fn name(&self) -> &str { "Flanger" }

    fn apply(&self, clip: Clip) -> Result<Clip, EffectError> {
        let offset = clip.samples_for_ms(self.delay_ms);
        Ok(clip.with_samples(overlay(&clip.samples, &clip.samples, offset)))
    }
}
