//! Digital push-button capability

use crate::error::Result;

/// A debounced momentary button
pub trait Button {
    /// Current physical state
    fn is_pressed(&self) -> bool;

    /// Block until the next press edge
    fn wait_for_press(&mut self) -> Result<()>;
}
