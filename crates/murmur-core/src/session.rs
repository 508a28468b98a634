//! Press → capture → persist loop run on the main thread

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use tracing::{error, info};

use crate::button::Button;
use crate::capture::{CaptureEngine, CaptureOutcome};
use crate::codec::Codec;
use crate::device::DeviceHandle;
use crate::error::MurmurError;
use crate::recording::RecordingStore;
use crate::stream::AudioInput;

/// Pause after the button itself fails, so a missing device does not spin
const BUTTON_RETRY: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub enum CycleOutcome {
    Saved(PathBuf),
    /// Silent or failed capture, nothing written
    Discarded,
    /// Capture succeeded but the file could not be written
    SaveFailed(MurmurError),
}

pub struct CaptureSession<I, C> {
    engine: CaptureEngine,
    input: I,
    device: DeviceHandle,
    store: RecordingStore<C>,
}

impl<I: AudioInput, C: Codec> CaptureSession<I, C> {
    pub fn new(engine: CaptureEngine, input: I, device: DeviceHandle, store: RecordingStore<C>) -> Self {
        Self { engine, input, device, store }
    }

    pub fn store(&self) -> &RecordingStore<C> {
        &self.store
    }

    /// Capture while `button` is held and save the result if it is usable
    pub fn record_once<B: Button + ?Sized>(&mut self, button: &B) -> CycleOutcome {
        info!("Recording...");
        let buffer = match self.engine.capture(&self.input, &self.device, button) {
            CaptureOutcome::Accepted(buffer) => buffer,
            CaptureOutcome::Rejected(_) => return CycleOutcome::Discarded,
        };

        let path = self.store.next_path();
        match self.store.save(&buffer, &path) {
            Ok(()) => CycleOutcome::Saved(path),
            Err(e) => {
                error!(error = %e, path = %path.display(), "Failed to save recording");
                CycleOutcome::SaveFailed(e)
            }
        }
    }

    /// Wait for presses and record forever
    pub fn run<B: Button>(&mut self, button: &mut B) -> ! {
        info!("Ready, press the button to record");
        loop {
            if let Err(e) = button.wait_for_press() {
                error!(error = %e, "Button read failed");
                thread::sleep(BUTTON_RETRY);
                continue;
            }
            self.record_once(button);
        }
    }
}
