//! Tunables for the appliance, loaded once at startup

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::device::DeviceHandle;
use crate::error::{MurmurError, Result};

/// Top-level settings, usually read from `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Shared directory holding one file per accepted capture
    pub recordings_dir: PathBuf,
    /// Container recordings are written in
    pub format: AudioFormat,
    pub capture: CaptureSettings,
    pub playback: PlaybackSettings,
    pub devices: DeviceSettings,
    pub button: ButtonSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            recordings_dir: PathBuf::from("recordings"),
            format: AudioFormat::default(),
            capture: CaptureSettings::default(),
            playback: PlaybackSettings::default(),
            devices: DeviceSettings::default(),
            button: ButtonSettings::default(),
        }
    }
}

impl Settings {
    /// Reject values the engines cannot work with
    pub fn validate(&self) -> Result<()> {
        self.capture.validate()?;
        if self.devices.input_keywords.is_empty() || self.devices.output_keywords.is_empty() {
            return Err(MurmurError::Settings(
                "device keyword lists must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Recording file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// Lossless compressed
    #[default]
    Flac,
    Wav,
}

/// Upper bound for the priming read and the capture ceiling
const MAX_CAPTURE_SECS: f64 = 3600.0;
const MAX_CHUNK_SECS: f64 = 10.0;

fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(MurmurError::Settings(format!("{name} {value} is outside {min}..={max}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub sample_rate: u32,
    /// Linear gain applied to every captured chunk
    pub gain: f32,
    /// Target bit depth of the quantized recording (at most 16)
    pub bit_depth: u16,
    /// Audio read unconditionally on every press, in seconds
    pub min_duration_secs: f64,
    /// Safety ceiling on a single capture, in seconds
    pub max_duration_secs: f64,
    /// Size of each streamed read while the button is held, in seconds
    pub chunk_duration_secs: f64,
    /// Peak amplitude below which a capture counts as silence
    pub silence_threshold: f32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            gain: 0.8,
            bit_depth: 16,
            min_duration_secs: 0.1,
            max_duration_secs: 10.0,
            chunk_duration_secs: 0.25,
            silence_threshold: 1e-5,
        }
    }
}

impl CaptureSettings {
    pub fn min_frames(&self) -> usize {
        (self.sample_rate as f64 * self.min_duration_secs) as usize
    }

    pub fn chunk_frames(&self) -> usize {
        (self.sample_rate as f64 * self.chunk_duration_secs) as usize
    }

    pub fn max_duration(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.max_duration_secs).map_err(|e| {
            MurmurError::Settings(format!("max_duration_secs {}: {e}", self.max_duration_secs))
        })
    }

    fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(MurmurError::Settings("sample_rate must be positive".into()));
        }
        if !(2..=16).contains(&self.bit_depth) {
            return Err(MurmurError::Settings(format!(
                "bit_depth {} is outside 2..=16",
                self.bit_depth
            )));
        }
        check_range("min_duration_secs", self.min_duration_secs, 0.0, MAX_CAPTURE_SECS)?;
        check_range("max_duration_secs", self.max_duration_secs, f64::MIN_POSITIVE, MAX_CAPTURE_SECS)?;
        check_range("chunk_duration_secs", self.chunk_duration_secs, f64::MIN_POSITIVE, MAX_CHUNK_SECS)?;
        if self.chunk_frames() == 0 {
            return Err(MurmurError::Settings("chunk_duration_secs is too small".into()));
        }
        if !self.gain.is_finite() || !self.silence_threshold.is_finite() || self.silence_threshold < 0.0 {
            return Err(MurmurError::Settings("gain and silence_threshold must be finite".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Sleep after an empty listing or a failed iteration
    pub idle_backoff_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self { idle_backoff_ms: 1000 }
    }
}

impl PlaybackSettings {
    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    pub input_keywords: Vec<String>,
    pub output_keywords: Vec<String>,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            input_keywords: vec!["usb".into()],
            output_keywords: vec!["bcm2835".into()],
        }
    }
}

/// Button wired through the kernel `gpio-keys` driver
/// (`dtoverlay=gpio-key,gpio=4,keycode=116`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonSettings {
    /// evdev node exposing the button
    pub device: PathBuf,
    /// Linux input key code reported on press
    pub key_code: u16,
    /// Presses closer together than this are ignored
    pub debounce_ms: u64,
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/input/event0"),
            key_code: 116,
            debounce_ms: 50,
        }
    }
}

/// Everything the running appliance needs, fixed after startup
#[derive(Debug, Clone)]
pub struct ApplianceConfig {
    pub settings: Settings,
    pub input: DeviceHandle,
    pub output: DeviceHandle,
}
