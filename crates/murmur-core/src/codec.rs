//! Audio file encode/decode capability

use std::path::Path;

use crate::clip::Clip;
use crate::error::Result;

pub trait Codec: Send + Sync {
    /// File extension written by `encode`, without the dot
    fn extension(&self) -> &str;

    /// Write mono 16-bit samples to `path`
    fn encode(&self, samples: &[i16], sample_rate: u32, path: &Path) -> Result<()>;

    fn decode(&self, path: &Path) -> Result<Clip>;
}
