//! Audio input service for microphone capture

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize, Device, FromSample, SampleFormat, SampleRate, StreamConfig};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use murmur_core::{AudioInput, DeviceHandle, InputStream, MurmurError};
use thiserror::Error;
use tracing::{error, info};

use crate::audio_io::find_device;

/// Longest a read waits for the device before giving up
const READ_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum AudioInputError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),
    #[error("Failed to get input config: {0}")]
    ConfigError(String),
    #[error("Failed to build input stream: {0}")]
    StreamError(String),
    #[error("Input stream reported an error")]
    DeviceFailed,
    #[error("Input stream stalled for {0:?}")]
    Stalled(Duration),
    #[error("Input stream closed")]
    Closed,
}

impl From<AudioInputError> for MurmurError {
    fn from(e: AudioInputError) -> Self {
        MurmurError::Stream(e.to_string())
    }
}

/// Opens mono capture streams on cpal devices
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalInput;

impl AudioInput for CpalInput {
    type Stream = CpalInputStream;

    fn open(&self, device: &DeviceHandle, sample_rate: u32) -> murmur_core::Result<CpalInputStream> {
        Ok(CpalInputStream::open(device, sample_rate)?)
    }
}

/// Blocking reader over a running cpal input stream.
/// Dropping it stops the stream.
pub struct CpalInputStream {
    rx: Receiver<Vec<f32>>,
    pending: Vec<f32>,
    failed: Arc<AtomicBool>,
    _stream: cpal::Stream,
}

impl CpalInputStream {
    pub fn open(handle: &DeviceHandle, sample_rate: u32) -> Result<Self, AudioInputError> {
        let device = find_device(handle).ok_or_else(|| AudioInputError::DeviceNotFound(handle.name.clone()))?;
        let default_config = device
            .default_input_config()
            .map_err(|e| AudioInputError::ConfigError(e.to_string()))?;

        let stream_config = StreamConfig {
            channels: 1,
            sample_rate: SampleRate(sample_rate),
            buffer_size: BufferSize::Default,
        };

        info!(
            device = %handle.name,
            sample_rate,
            format = ?default_config.sample_format(),
            "Starting audio input stream"
        );

        let (tx, rx) = bounded::<Vec<f32>>(256);
        let failed = Arc::new(AtomicBool::new(false));

        let stream = match default_config.sample_format() {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &stream_config, tx, failed.clone()),
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &stream_config, tx, failed.clone()),
            SampleFormat::I32 => Self::build_stream::<i32>(&device, &stream_config, tx, failed.clone()),
            format => return Err(AudioInputError::ConfigError(format!("Unsupported format: {:?}", format))),
        }?;

        stream.play().map_err(|e| AudioInputError::StreamError(e.to_string()))?;

        Ok(Self {
            rx,
            pending: Vec::new(),
            failed,
            _stream: stream,
        })
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        tx: Sender<Vec<f32>>,
        failed: Arc<AtomicBool>,
    ) -> Result<cpal::Stream, AudioInputError>
    where
        T: cpal::Sample + cpal::SizedSample + Send + 'static,
        f32: cpal::FromSample<T>,
    {
        device
            .build_input_stream(
                config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    let samples: Vec<f32> = data.iter().map(|s| f32::from_sample_(*s)).collect();
                    let _ = tx.try_send(samples);
                },
                move |err| {
                    error!("Input stream error: {}", err);
                    failed.store(true, Ordering::SeqCst);
                },
                None,
            )
            .map_err(|e| AudioInputError::StreamError(e.to_string()))
    }

    fn read_frames(&mut self, frames: usize) -> Result<Vec<f32>, AudioInputError> {
        while self.pending.len() < frames {
            if self.failed.load(Ordering::SeqCst) {
                return Err(AudioInputError::DeviceFailed);
            }
            match self.rx.recv_timeout(READ_TIMEOUT) {
                Ok(chunk) => self.pending.extend(chunk),
                Err(RecvTimeoutError::Timeout) => return Err(AudioInputError::Stalled(READ_TIMEOUT)),
                Err(RecvTimeoutError::Disconnected) => return Err(AudioInputError::Closed),
            }
        }
        Ok(self.pending.drain(..frames).collect())
    }
}

impl InputStream for CpalInputStream {
    fn read(&mut self, frames: usize) -> murmur_core::Result<Vec<f32>> {
        Ok(self.read_frames(frames)?)
    }
}
