//! Uncompressed WAV via hound

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use murmur_core::{Clip, Codec};

use super::{CodecError, rescale_int};

/// Mono 16-bit PCM WAV files
#[derive(Debug, Default, Clone, Copy)]
pub struct WavCodec;

impl WavCodec {
    pub fn write(samples: &[i16], sample_rate: u32, path: &Path) -> Result<(), CodecError> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Read any PCM or float WAV as interleaved 16-bit samples
    pub fn read(path: &Path) -> Result<Clip, CodecError> {
        let mut reader = WavReader::open(path)?;
        let spec = reader.spec();

        let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) => reader.samples::<i16>().collect::<Result<_, _>>()?,
            (SampleFormat::Int, bits @ 8..=32) => reader
                .samples::<i32>()
                .map(|s| s.map(|v| rescale_int(v, bits as u32)))
                .collect::<Result<_, _>>()?,
            (SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
                .collect::<Result<_, _>>()?,
            (format, bits) => {
                return Err(CodecError::Unsupported(format!("{format:?} WAV at {bits} bits")));
            }
        };

        Ok(Clip::new(samples, spec.sample_rate, spec.channels))
    }
}

impl Codec for WavCodec {
    fn extension(&self) -> &str {
        "wav"
    }

    fn encode(&self, samples: &[i16], sample_rate: u32, path: &Path) -> murmur_core::Result<()> {
        Ok(Self::write(samples, sample_rate, path)?)
    }

    fn decode(&self, path: &Path) -> murmur_core::Result<Clip> {
        Ok(Self::read(path)?)
    }
}
