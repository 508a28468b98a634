//! Push-button input from an evdev node
//!
//! On the appliance the button is a GPIO line bound by the kernel
//! `gpio-keys` driver, which reports it as a key on an input device.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use evdev::{Device, InputEventKind, Key};
use murmur_core::{Button, ButtonSettings, MurmurError};
use thiserror::Error;
use tracing::{debug, info, warn};

const KEY_PRESSED: i32 = 1;

#[derive(Debug, Error)]
pub enum ButtonError {
    #[error("Failed to open {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("Device {path} does not report key code {code}")]
    UnsupportedKey { path: PathBuf, code: u16 },
    #[error("Failed to read button events: {0}")]
    Read(#[from] io::Error),
}

impl From<ButtonError> for MurmurError {
    fn from(e: ButtonError) -> Self {
        MurmurError::Button(e.to_string())
    }
}

/// Drops presses arriving within `window` of the last accepted one
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn accept(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < self.window {
                debug!("Button press debounced");
                return false;
            }
        }
        self.last = Some(now);
        true
    }
}

pub struct EvdevButton {
    device: Device,
    key: Key,
    debouncer: Debouncer,
}

impl EvdevButton {
    pub fn open(settings: &ButtonSettings) -> Result<Self, ButtonError> {
        let device = Device::open(&settings.device).map_err(|source| ButtonError::Open {
            path: settings.device.clone(),
            source,
        })?;
        let key = Key::new(settings.key_code);

        if !device.supported_keys().is_some_and(|keys| keys.contains(key)) {
            return Err(ButtonError::UnsupportedKey {
                path: settings.device.clone(),
                code: settings.key_code,
            });
        }

        info!(
            device = device.name().unwrap_or("unnamed"),
            path = %settings.device.display(),
            key = ?key,
            "Button ready"
        );

        Ok(Self {
            device,
            key,
            debouncer: Debouncer::new(Duration::from_millis(settings.debounce_ms)),
        })
    }
}

impl Button for EvdevButton {
    fn is_pressed(&self) -> bool {
        match self.device.get_key_state() {
            Ok(state) => state.contains(self.key),
            Err(e) => {
                warn!(error = %e, "Failed to read button state");
                false
            }
        }
    }

    fn wait_for_press(&mut self) -> murmur_core::Result<()> {
        let key = self.key;
        loop {
            let pressed = self
                .device
                .fetch_events()
                .map_err(ButtonError::Read)?
                .any(|event| {
                    matches!(event.kind(), InputEventKind::Key(k) if k == key)
                        && event.value() == KEY_PRESSED
                });
            if pressed && self.debouncer.accept(Instant::now()) {
                return Ok(());
            }
        }
    }
}
