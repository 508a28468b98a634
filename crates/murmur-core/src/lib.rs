//! murmur-core: capture engine, recordings store and hardware capabilities

pub mod button;
pub mod capture;
mod clip;
pub mod codec;
pub mod device;
mod error;
pub mod recording;
pub mod session;
pub mod settings;
pub mod stream;

#[cfg(test)]
mod testing;

pub use button::Button;
pub use capture::{CaptureEngine, CaptureOutcome, CaptureState, QuantizedBuffer, RejectReason};
pub use clip::Clip;
pub use codec::Codec;
pub use device::{DeviceCatalog, DeviceHandle, DeviceInfo, Direction, resolve_device};
pub use error::{MurmurError, Result};
pub use recording::{RecordingStore, list_recordings};
pub use session::{CaptureSession, CycleOutcome};
pub use settings::{
    ApplianceConfig, AudioFormat, ButtonSettings, CaptureSettings, DeviceSettings, PlaybackSettings,
    Settings,
};
pub use stream::{AudioInput, AudioOutput, InputStream};
