//! In-memory stand-ins for the hardware capabilities

use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::button::Button;
use crate::clip::Clip;
use crate::codec::Codec;
use crate::device::{DeviceHandle, Direction};
use crate::error::{MurmurError, Result};
use crate::stream::{AudioInput, InputStream};

pub fn test_device() -> DeviceHandle {
    DeviceHandle {
        index: 0,
        name: "USB PnP Sound Device".into(),
        direction: Direction::Input,
    }
}

/// Produces a fixed-amplitude waveform whose peak is exactly `amplitude`
pub struct MockInput {
    amplitude: f32,
    fail_open: bool,
    fail_after_reads: Option<usize>,
    realtime: bool,
    pub opened: Cell<usize>,
}

impl MockInput {
    pub fn tone(amplitude: f32) -> Self {
        Self {
            amplitude,
            fail_open: false,
            fail_after_reads: None,
            realtime: false,
            opened: Cell::new(0),
        }
    }

    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::tone(0.0)
        }
    }

    pub fn fail_after_reads(mut self, reads: usize) -> Self {
        self.fail_after_reads = Some(reads);
        self
    }

    /// Each read sleeps for the audio duration it returns
    pub fn realtime(mut self) -> Self {
        self.realtime = true;
        self
    }
}

impl AudioInput for MockInput {
    type Stream = MockStream;

    fn open(&self, _device: &DeviceHandle, sample_rate: u32) -> Result<MockStream> {
        if self.fail_open {
            return Err(MurmurError::Stream("device unplugged".into()));
        }
        self.opened.set(self.opened.get() + 1);
        Ok(MockStream {
            amplitude: self.amplitude,
            sample_rate,
            reads: 0,
            fail_after_reads: self.fail_after_reads,
            realtime: self.realtime,
        })
    }
}

pub struct MockStream {
    amplitude: f32,
    sample_rate: u32,
    reads: usize,
    fail_after_reads: Option<usize>,
    realtime: bool,
}

impl InputStream for MockStream {
    fn read(&mut self, frames: usize) -> Result<Vec<f32>> {
        if self.fail_after_reads.is_some_and(|limit| self.reads >= limit) {
            return Err(MurmurError::Stream("stream closed".into()));
        }
        self.reads += 1;
        if self.realtime {
            thread::sleep(Duration::from_secs_f64(frames as f64 / self.sample_rate as f64));
        }
        Ok((0..frames)
            .map(|i| if i % 2 == 0 { self.amplitude } else { -self.amplitude * 0.5 })
            .collect())
    }
}

/// Reports pressed for a fixed number of polls
pub struct ScriptedButton {
    remaining: AtomicUsize,
}

impl ScriptedButton {
    pub fn new(polls: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(polls),
        }
    }
}

impl Button for ScriptedButton {
    fn is_pressed(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn wait_for_press(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Reports pressed until a wall-clock deadline
pub struct HeldButton {
    released_at: Instant,
}

impl HeldButton {
    pub fn for_duration(held: Duration) -> Self {
        Self {
            released_at: Instant::now() + held,
        }
    }
}

impl Button for HeldButton {
    fn is_pressed(&self) -> bool {
        Instant::now() < self.released_at
    }

    fn wait_for_press(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Stores samples as raw little-endian bytes and counts writes per path
#[derive(Default)]
pub struct RawCodec {
    pub writes: Mutex<HashMap<PathBuf, usize>>,
}

impl Codec for RawCodec {
    fn extension(&self) -> &str {
        "raw"
    }

    fn encode(&self, samples: &[i16], _sample_rate: u32, path: &Path) -> Result<()> {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        fs::write(path, bytes)?;
        if let Ok(mut writes) = self.writes.lock() {
            *writes.entry(path.to_path_buf()).or_default() += 1;
        }
        Ok(())
    }

    fn decode(&self, path: &Path) -> Result<Clip> {
        let bytes = fs::read(path)?;
        let samples = bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        Ok(Clip::mono(samples, 44100))
    }
}
