//! murmur-services: cpal, codec and evdev backends, effects and the player

pub mod audio_effects;
pub mod audio_input;
pub mod audio_io;
pub mod button;
pub mod codec;
pub mod player;
pub mod resample;

pub use audio_effects::{ClipEffect, EffectChoices, EffectError, EffectPlan};
pub use audio_input::{AudioInputError, CpalInput, CpalInputStream};
pub use audio_io::{AudioOutputError, CpalCatalog, CpalOutput};
pub use button::{ButtonError, EvdevButton};
pub use codec::{CodecError, FlacCodec, RecordingCodec, WavCodec};
pub use player::{PlaybackStep, Player};
