//! Capabilities for streaming audio in and out of hardware

use crate::clip::Clip;
use crate::device::DeviceHandle;
use crate::error::Result;

/// Opens capture sessions on an input device
pub trait AudioInput {
    type Stream: InputStream;

    /// Open a mono f32 stream at `sample_rate`
    fn open(&self, device: &DeviceHandle, sample_rate: u32) -> Result<Self::Stream>;
}

/// An open capture session. Dropping it closes the device.
pub trait InputStream {
    /// Block until `frames` mono samples have been captured
    fn read(&mut self, frames: usize) -> Result<Vec<f32>>;
}

/// Renders clips to an output device
pub trait AudioOutput {
    /// Play `clip` and return once it has finished
    fn play_blocking(&self, device: &DeviceHandle, clip: &Clip) -> Result<()>;
}
