//! Device enumeration and blocking playback through cpal

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, StreamConfig};
use murmur_core::{AudioOutput, Clip, DeviceCatalog, DeviceHandle, DeviceInfo, MurmurError};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::resample::{ResampleError, resample_if_needed, to_mono};

/// Extra wait after the last sample is handed to the device
const DRAIN_TAIL: Duration = Duration::from_millis(150);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum AudioOutputError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),
    #[error("Failed to enumerate devices: {0}")]
    EnumerationError(String),
    #[error("Failed to get default output config: {0}")]
    ConfigError(String),
    #[error("Failed to build output stream: {0}")]
    StreamError(String),
    #[error("Playback failed: {0}")]
    PlaybackError(#[from] ResampleError),
}

impl From<AudioOutputError> for MurmurError {
    fn from(e: AudioOutputError) -> Self {
        match e {
            AudioOutputError::DeviceNotFound(_) | AudioOutputError::EnumerationError(_) => {
                MurmurError::Device(e.to_string())
            }
            _ => MurmurError::Playback(e.to_string()),
        }
    }
}

/// Look up the cpal device behind a resolved handle.
///
/// The enumeration index is tried first, then the name, in case the host
/// reordered its devices since startup.
pub fn find_device(handle: &DeviceHandle) -> Option<Device> {
    let host = cpal::default_host();
    let devices: Vec<Device> = host.devices().ok()?.collect();

    let at_index = devices
        .get(handle.index)
        .is_some_and(|d| d.name().is_ok_and(|n| n == handle.name));
    if at_index {
        return devices.into_iter().nth(handle.index);
    }
    devices
        .into_iter()
        .find(|d| d.name().is_ok_and(|n| n == handle.name))
}

/// All devices of the default cpal host, in enumeration order
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalCatalog;

impl DeviceCatalog for CpalCatalog {
    fn devices(&self) -> murmur_core::Result<Vec<DeviceInfo>> {
        let host = cpal::default_host();
        let devices = host
            .devices()
            .map_err(|e| AudioOutputError::EnumerationError(e.to_string()))?
            .map(|device| {
                let name = device.name().unwrap_or_default();
                let max_input_channels = device
                    .supported_input_configs()
                    .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
                    .unwrap_or(0);
                let max_output_channels = device
                    .supported_output_configs()
                    .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
                    .unwrap_or(0);
                DeviceInfo { name, max_input_channels, max_output_channels }
            })
            .collect::<Vec<_>>();

        info!(count = devices.len(), host = ?host.id(), "Found audio devices");
        Ok(devices)
    }
}

/// Renders clips on a cpal output device
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalOutput;

impl CpalOutput {
    /// Play `clip` and block until the device has consumed it
    pub fn play(handle: &DeviceHandle, clip: &Clip) -> Result<(), AudioOutputError> {
        let device = find_device(handle).ok_or_else(|| AudioOutputError::DeviceNotFound(handle.name.clone()))?;
        let supported_config = device
            .default_output_config()
            .map_err(|e| AudioOutputError::ConfigError(e.to_string()))?;

        let device_sample_rate = supported_config.sample_rate().0;
        let channels = supported_config.channels() as usize;
        let sample_format = supported_config.sample_format();

        debug!(
            device = %handle.name,
            sample_rate = device_sample_rate,
            channels,
            input_samples = clip.samples.len(),
            "Starting audio playback"
        );

        let mono = to_mono(&clip.to_f32(), clip.channels as usize);
        let resampled = resample_if_needed(&mono, clip.sample_rate, device_sample_rate)?;

        // Convert mono to output channels
        let output_samples: Vec<f32> = resampled
            .iter()
            .flat_map(|&s| std::iter::repeat_n(s, channels))
            .collect();

        let total_samples = output_samples.len();
        let samples = Arc::new(output_samples);
        let position = Arc::new(AtomicUsize::new(0));
        let config: StreamConfig = supported_config.into();

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, samples, position.clone()),
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, samples, position.clone()),
            SampleFormat::I32 => Self::build_stream::<i32>(&device, &config, samples, position.clone()),
            format => return Err(AudioOutputError::ConfigError(format!("Unsupported format: {:?}", format))),
        }?;

        stream.play().map_err(|e| AudioOutputError::StreamError(e.to_string()))?;

        let duration_secs = total_samples as f64 / (device_sample_rate as f64 * channels as f64);
        let timeout = Duration::from_secs_f64(duration_secs + 0.5);
        if !wait_until_consumed(&position, total_samples, timeout) {
            return Err(AudioOutputError::StreamError(format!(
                "device stalled at {} of {} samples",
                position.load(Ordering::SeqCst),
                total_samples
            )));
        }
        thread::sleep(DRAIN_TAIL);

        Ok(())
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        samples: Arc<Vec<f32>>,
        position: Arc<AtomicUsize>,
    ) -> Result<cpal::Stream, AudioOutputError>
    where
        T: cpal::Sample + cpal::SizedSample + FromSample<f32> + Send + 'static,
    {
        let total_samples = samples.len();
        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let pos = position.load(Ordering::SeqCst);
                    for (i, sample) in data.iter_mut().enumerate() {
                        let value = samples.get(pos + i).copied().unwrap_or(0.0);
                        *sample = T::from_sample_(value);
                    }
                    let new_pos = (pos + data.len()).min(total_samples);
                    position.store(new_pos, Ordering::SeqCst);
                },
                move |err| error!("Playback stream error: {}", err),
                None,
            )
            .map_err(|e| AudioOutputError::StreamError(e.to_string()))
    }
}

/// Poll the callback's read position until it reaches `total` or `timeout` passes
fn wait_until_consumed(position: &AtomicUsize, total: usize, timeout: Duration) -> bool {
    let start = Instant::now();
    loop {
        if position.load(Ordering::SeqCst) >= total {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

impl AudioOutput for CpalOutput {
    fn play_blocking(&self, device: &DeviceHandle, clip: &Clip) -> murmur_core::Result<()> {
        Ok(Self::play(device, clip)?)
    }
}
