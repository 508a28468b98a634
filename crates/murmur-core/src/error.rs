//! Error types for murmur

use thiserror::Error;

use crate::device::Direction;

#[derive(Debug, Error)]
pub enum MurmurError {
    #[error("No {direction} device matches keywords {keywords:?}")]
    DeviceNotFound {
        keywords: Vec<String>,
        direction: Direction,
    },
    #[error("Device error: {0}")]
    Device(String),
    #[error("Stream error: {0}")]
    Stream(String),
    #[error("Playback error: {0}")]
    Playback(String),
    #[error("Codec error: {0}")]
    Codec(String),
    #[error("Button error: {0}")]
    Button(String),
    #[error("Invalid settings: {0}")]
    Settings(String),
    #[error("Refusing to persist an empty recording")]
    EmptyRecording,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MurmurError>;
