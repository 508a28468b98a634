//! Randomized effect chain applied to each clip before playback

mod native;
mod pitch;

pub use native::{Distortion, Echo, Flanger, Fuzz, apply_gain, overlay};
pub use pitch::PitchShift;

use std::fmt::Debug;

use murmur_core::{Clip, MurmurError};
use thiserror::Error;

use crate::resample::ResampleError;

/// Semitone choices for the pitch stage, drawn uniformly
pub const PITCH_CHOICES: [Option<i32>; 5] = [None, Some(-2), Some(-1), Some(1), Some(2)];

pub const DISTORTION_PROBABILITY: f64 = 0.4;
pub const FUZZ_PROBABILITY: f64 = 0.3;
pub const ECHO_PROBABILITY: f64 = 0.4;
pub const FLANGER_PROBABILITY: f64 = 0.3;

#[derive(Debug, Error)]
pub enum EffectError {
    #[error("{0}")]
    Resample(#[from] ResampleError),
}

impl From<EffectError> for MurmurError {
    fn from(e: EffectError) -> Self {
        MurmurError::Playback(e.to_string())
    }
}

/// Whole-clip transform. Must accept an empty clip.
pub trait ClipEffect: Send + Debug {
    fn name(&self) -> &str;
    fn apply(&self, clip: Clip) -> Result<Clip, EffectError>;
}

/// Randomly drawn parameters for one playback
#[derive(Debug, Clone, PartialEq)]
pub struct EffectChoices {
    pub semitones: Option<i32>,
    pub distortion_db: Option<f32>,
    pub fuzz: bool,
    pub echo_ms: Option<u32>,
    pub flanger_ms: Option<u32>,
}

impl EffectChoices {
    /// Pitch is always drawn; the other stages are each included independently
    pub fn draw(rng: &mut fastrand::Rng) -> Self {
        let semitones = PITCH_CHOICES[rng.usize(..PITCH_CHOICES.len())];
        let distortion_db = (rng.f64() < DISTORTION_PROBABILITY).then(|| rng.i32(6..=14) as f32);
        let fuzz = rng.f64() < FUZZ_PROBABILITY;
        let echo_ms = (rng.f64() < ECHO_PROBABILITY).then(|| rng.u32(150..=400));
        let flanger_ms = (rng.f64() < FLANGER_PROBABILITY).then(|| rng.u32(5..=20));
        Self { semitones, distortion_db, fuzz, echo_ms, flanger_ms }
    }
}

/// Effects for one playback, applied in order
#[derive(Debug, Default)]
pub struct EffectPlan {
    effects: Vec<Box<dyn ClipEffect>>,
}

impl From<&EffectChoices> for EffectPlan {
    fn from(choices: &EffectChoices) -> Self {
        let mut plan = Self::new();
        plan.add(Box::new(PitchShift::new(choices.semitones)));
        if let Some(gain_db) = choices.distortion_db {
            plan.add(Box::new(Distortion { gain_db }));
        }
        if choices.fuzz {
            plan.add(Box::new(Fuzz::default()));
        }
        if let Some(delay_ms) = choices.echo_ms {
            plan.add(Box::new(Echo::new(delay_ms)));
        }
        if let Some(delay_ms) = choices.flanger_ms {
            plan.add(Box::new(Flanger { delay_ms }));
        }
        plan
    }
}

impl EffectPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(rng: &mut fastrand::Rng) -> Self {
        Self::from(&EffectChoices::draw(rng))
    }

    pub fn add(&mut self, effect: Box<dyn ClipEffect>) {
        self.effects.push(effect);
    }

    pub fn process(&self, clip: Clip) -> Result<Clip, EffectError> {
        self.effects.iter().try_fold(clip, |clip, effect| effect.apply(clip))
    }

    pub fn names(&self) -> Vec<&str> {
        self.effects.iter().map(|e| e.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
