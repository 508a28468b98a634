//! Recordings directory: naming, saving, listing
//!
//! The directory is shared with the player without locking. Saves go to a
//! hidden temporary file that is renamed into place, and listings skip
//! anything hidden or unreadable.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

use crate::capture::QuantizedBuffer;
use crate::codec::Codec;
use crate::error::{MurmurError, Result};

const FILENAME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

pub struct RecordingStore<C> {
    dir: PathBuf,
    codec: C,
}

impl<C: Codec> RecordingStore<C> {
    /// Use `dir` for recordings, creating it if needed
    pub fn open(dir: impl AsRef<Path>, codec: C) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, codec })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Path for a recording finished at `timestamp`.
    ///
    /// Second resolution: two recordings finished within the same second get
    /// the same path and the later one replaces the earlier.
    pub fn path_for(&self, timestamp: NaiveDateTime) -> PathBuf {
        self.dir.join(format!(
            "{}.{}",
            timestamp.format(FILENAME_FORMAT),
            self.codec.extension()
        ))
    }

    pub fn next_path(&self) -> PathBuf {
        self.path_for(Local::now().naive_local())
    }

    /// Encode `buffer` to `path` via a temporary sibling and a rename
    pub fn save(&self, buffer: &QuantizedBuffer, path: &Path) -> Result<()> {
        if buffer.samples.is_empty() {
            return Err(MurmurError::EmptyRecording);
        }

        let tmp = temp_path(path);
        let written = self
            .codec
            .encode(&buffer.samples, buffer.sample_rate, &tmp)
            .and_then(|()| fs::rename(&tmp, path).map_err(MurmurError::from));
        if let Err(e) = written {
            discard_temp(&tmp);
            return Err(e);
        }

        info!(path = %path.display(), samples = buffer.samples.len(), "Saved recording");
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<PathBuf>> {
        list_recordings(&self.dir, self.codec.extension())
    }
}

fn discard_temp(tmp: &Path) {
    match fs::remove_file(tmp) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %tmp.display(), error = %e, "Failed to remove temporary file"),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Recordings in `dir` with `extension`, sorted by name.
///
/// Entries that vanish or fail to stat mid-scan are skipped.
pub fn list_recordings(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .map(|entry| entry.path())
        .filter(|path| is_recording(path, extension))
        .collect();
    files.sort();
    Ok(files)
}

fn is_recording(path: &Path, extension: &str) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_none_or(|n| n.starts_with('.'));
    if hidden {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}
