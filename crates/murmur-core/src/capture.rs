//! Button-gated capture state machine
//!
//! A capture always reads a minimum-length priming chunk, then keeps reading
//! fixed-size chunks while the button is held, up to a wall-clock ceiling.
//! The result is peak-normalized and quantized, or rejected when silent.

use std::fmt;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::button::Button;
use crate::device::DeviceHandle;
use crate::error::{MurmurError, Result};
use crate::settings::CaptureSettings;
use crate::stream::{AudioInput, InputStream};

/// Where the engine is in a capture attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Priming,
    Streaming,
    Finalizing,
    Accepted,
    Rejected,
}

/// Peak-normalized fixed-point audio ready for persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedBuffer {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

#[derive(Debug)]
pub enum RejectReason {
    /// Peak amplitude stayed under the silence threshold
    Silent { peak: f32 },
    /// The input device failed mid-capture
    Stream(MurmurError),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silent { peak } => write!(f, "silent capture (peak {peak:e})"),
            Self::Stream(e) => write!(f, "{e}"),
        }
    }
}

#[derive(Debug)]
pub enum CaptureOutcome {
    Accepted(QuantizedBuffer),
    Rejected(RejectReason),
}

pub struct CaptureEngine {
    settings: CaptureSettings,
    state: CaptureState,
}

impl CaptureEngine {
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            settings,
            state: CaptureState::Idle,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Run one capture attempt. Never fails: device errors become `Rejected`.
    pub fn capture<I, B>(&mut self, input: &I, device: &DeviceHandle, button: &B) -> CaptureOutcome
    where
        I: AudioInput,
        B: Button + ?Sized,
    {
        self.transition(CaptureState::Priming);
        let audio = match self.stream(input, device, button) {
            Ok(audio) => audio,
            Err(e) => {
                error!(error = %e, "Recording failed");
                self.transition(CaptureState::Rejected);
                return CaptureOutcome::Rejected(RejectReason::Stream(e));
            }
        };

        self.transition(CaptureState::Finalizing);
        let outcome = self.finalize(&audio);
        match &outcome {
            CaptureOutcome::Accepted(buffer) => {
                info!(samples = buffer.samples.len(), "Recording finished");
                self.transition(CaptureState::Accepted);
            }
            CaptureOutcome::Rejected(reason) => {
                info!(%reason, "Nothing to save");
                self.transition(CaptureState::Rejected);
            }
        }
        outcome
    }

    fn stream<I, B>(&mut self, input: &I, device: &DeviceHandle, button: &B) -> Result<Vec<f32>>
    where
        I: AudioInput,
        B: Button + ?Sized,
    {
        let started = Instant::now();
        let max_duration = self.settings.max_duration()?;
        let gain = self.settings.gain;
        let chunk_frames = self.settings.chunk_frames();

        let mut stream = input.open(device, self.settings.sample_rate)?;

        let priming = stream.read(self.settings.min_frames())?;
        let mut audio: Vec<f32> = priming.iter().map(|s| s * gain).collect();

        self.transition(CaptureState::Streaming);
        while button.is_pressed() {
            if started.elapsed() > max_duration {
                info!(
                    max_secs = self.settings.max_duration_secs,
                    "Recording hit the safety ceiling"
                );
                break;
            }
            let chunk = stream.read(chunk_frames)?;
            audio.extend(chunk.iter().map(|s| s * gain));
        }

        Ok(audio)
    }

    fn finalize(&self, audio: &[f32]) -> CaptureOutcome {
        let peak = peak(audio);
        if peak < self.settings.silence_threshold {
            return CaptureOutcome::Rejected(RejectReason::Silent { peak });
        }
        CaptureOutcome::Accepted(QuantizedBuffer {
            samples: quantize(audio, self.settings.bit_depth),
            sample_rate: self.settings.sample_rate,
        })
    }

    fn transition(&mut self, next: CaptureState) {
        debug!(from = ?self.state, to = ?next, "Capture state");
        self.state = next;
    }
}

/// Largest absolute sample, 0.0 for an empty buffer
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Largest positive value representable at `bit_depth`
pub fn full_scale(bit_depth: u16) -> i16 {
    ((1i32 << (bit_depth.clamp(2, 16) - 1)) - 1) as i16
}

/// Map the buffer's peak to full scale and truncate to integers.
/// An all-zero buffer stays all zeros.
pub fn quantize(samples: &[f32], bit_depth: u16) -> Vec<i16> {
    let peak = peak(samples);
    if peak == 0.0 {
        return vec![0; samples.len()];
    }
    let max_val = full_scale(bit_depth) as f32;
    samples.iter().map(|s| (s / peak * max_val) as i16).collect()
}
