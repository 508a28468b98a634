//! Recording file formats

mod flac;
mod wav;

pub use flac::FlacCodec;
pub use wav::WavCodec;

use std::path::Path;

use murmur_core::{AudioFormat, Clip, Codec, MurmurError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("FLAC error: {0}")]
    Flac(#[from] claxon::Error),
    #[error("FLAC encoding failed: {0}")]
    FlacEncode(String),
    #[error("Unsupported sample layout: {0}")]
    Unsupported(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CodecError> for MurmurError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Wav(hound::Error::IoError(io)) => MurmurError::Io(io),
            CodecError::Flac(claxon::Error::IoError(io)) | CodecError::Io(io) => MurmurError::Io(io),
            other => MurmurError::Codec(other.to_string()),
        }
    }
}

/// Codec picked by the `format` setting
#[derive(Debug, Clone, Copy)]
pub enum RecordingCodec {
    Flac(FlacCodec),
    Wav(WavCodec),
}

impl From<AudioFormat> for RecordingCodec {
    fn from(format: AudioFormat) -> Self {
        match format {
            AudioFormat::Flac => Self::Flac(FlacCodec),
            AudioFormat::Wav => Self::Wav(WavCodec),
        }
    }
}

impl Codec for RecordingCodec {
    fn extension(&self) -> &str {
        match self {
            Self::Flac(codec) => codec.extension(),
            Self::Wav(codec) => codec.extension(),
        }
    }

    fn encode(&self, samples: &[i16], sample_rate: u32, path: &Path) -> murmur_core::Result<()> {
        match self {
            Self::Flac(codec) => codec.encode(samples, sample_rate, path),
            Self::Wav(codec) => codec.encode(samples, sample_rate, path),
        }
    }

    fn decode(&self, path: &Path) -> murmur_core::Result<Clip> {
        match self {
            Self::Flac(codec) => codec.decode(path),
            Self::Wav(codec) => codec.decode(path),
        }
    }
}

/// Scale a `bits`-wide integer sample to 16 bits
fn rescale_int(value: i32, bits: u32) -> i16 {
    if bits > 16 {
        (value >> (bits - 16)) as i16
    } else {
        (value << (16 - bits)) as i16
    }
}
