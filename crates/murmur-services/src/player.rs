//! Endless random playback of the recordings directory

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use murmur_core::{AudioOutput, Codec, DeviceHandle, PlaybackSettings, list_recordings};
use tracing::{debug, error, info};

use crate::audio_effects::{EffectChoices, EffectPlan};

/// Result of one loop iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackStep {
    /// Nothing recorded yet
    Idle,
    Played(PathBuf),
}

pub struct Player<C, O> {
    dir: PathBuf,
    codec: C,
    output: O,
    device: DeviceHandle,
    backoff: Duration,
    rng: fastrand::Rng,
}

impl<C: Codec, O: AudioOutput> Player<C, O> {
    pub fn new(
        dir: impl AsRef<Path>,
        codec: C,
        output: O,
        device: DeviceHandle,
        settings: &PlaybackSettings,
    ) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            codec,
            output,
            device,
            backoff: settings.idle_backoff(),
            rng: fastrand::Rng::new(),
        }
    }

    /// Fix the random source, making file and effect choices reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Pick, decode, transform and play one recording
    pub fn run_once(&mut self) -> murmur_core::Result<PlaybackStep> {
        let files = list_recordings(&self.dir, self.codec.extension())?;
        if files.is_empty() {
            return Ok(PlaybackStep::Idle);
        }

        let path = files[self.rng.usize(..files.len())].clone();
        let clip = self.codec.decode(&path)?;

        let choices = EffectChoices::draw(&mut self.rng);
        debug!(?choices, "Drew effects");
        let clip = EffectPlan::from(&choices).process(clip)?;

        info!(path = %path.display(), duration = ?clip.duration(), "Playing recording");
        self.output.play_blocking(&self.device, &clip)?;
        Ok(PlaybackStep::Played(path))
    }

    /// Play forever; errors are logged and followed by the backoff sleep
    pub fn run(mut self) -> ! {
        info!(dir = %self.dir.display(), "Player started");
        loop {
            match self.run_once() {
                Ok(PlaybackStep::Played(_)) => {}
                Ok(PlaybackStep::Idle) => thread::sleep(self.backoff),
                Err(e) => {
                    error!(error = %e, "Playback failed");
                    thread::sleep(self.backoff);
                }
            }
        }
    }
}

impl<C, O> Player<C, O>
where
    C: Codec + 'static,
    O: AudioOutput + Send + 'static,
{
    /// Run on a dedicated thread that lives as long as the process
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("player".into())
            .spawn(move || {
                self.run();
            })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::{Arc, Mutex};

    use murmur_core::{Clip, Direction, MurmurError};

    use super::*;
    use crate::codec::FlacCodec;

    #[derive(Clone, Default)]
    struct CapturingOutput {
        played: Arc<Mutex<Vec<Clip>>>,
    }

    impl AudioOutput for CapturingOutput {
        fn play_blocking(&self, _device: &DeviceHandle, clip: &Clip) -> murmur_core::Result<()> {
            self.played.lock().unwrap().push(clip.clone());
            Ok(())
        }
    }

    struct FailingOutput;

    impl AudioOutput for FailingOutput {
        fn play_blocking(&self, device: &DeviceHandle, _clip: &Clip) -> murmur_core::Result<()> {
            Err(MurmurError::Device(format!("{} disappeared", device.name)))
        }
    }

    fn speaker() -> DeviceHandle {
        DeviceHandle {
            index: 0,
            name: "bcm2835 Headphones".into(),
            direction: Direction::Output,
        }
    }

    fn player<O: AudioOutput>(dir: &Path, output: O) -> Player<FlacCodec, O> {
        Player::new(dir, FlacCodec, output, speaker(), &PlaybackSettings::default()).with_seed(5)
    }

    fn write_recording(dir: &Path, name: &str, frames: usize) -> PathBuf {
        let path = dir.join(name);
        let samples: Vec<i16> = (0..frames).map(|i| ((i % 50) as i16 - 25) * 1000).collect();
        FlacCodec.encode(&samples, 44100, &path).unwrap();
        path
    }

    #[test]
    fn test_empty_directory_is_idle() {
        let tmp = tempfile::tempdir().unwrap();
        let output = CapturingOutput::default();
        let mut player = player(tmp.path(), output.clone());

        assert_eq!(player.run_once().unwrap(), PlaybackStep::Idle);
        assert_eq!(player.run_once().unwrap(), PlaybackStep::Idle);
        assert_eq!(player.backoff(), Duration::from_secs(1));
        assert!(output.played.lock().unwrap().is_empty());
    }

    #[test]
    fn test_plays_a_recording() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_recording(tmp.path(), "2025-01-01-10-00-00.flac", 4410);
        let output = CapturingOutput::default();
        let mut player = player(tmp.path(), output.clone());

        assert_eq!(player.run_once().unwrap(), PlaybackStep::Played(path));
        let played = output.played.lock().unwrap();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].sample_rate, 44100);
        assert!(!played[0].is_empty());
    }

    #[test]
    fn test_ignores_half_written_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(".2025-01-01-10-00-01.flac.tmp"), b"RIFF").unwrap();
        let mut player = player(tmp.path(), CapturingOutput::default());

        assert_eq!(player.run_once().unwrap(), PlaybackStep::Idle);
    }

    #[test]
    fn test_same_seed_same_selection() {
        let tmp = tempfile::tempdir().unwrap();
        for second in 0..6 {
            write_recording(tmp.path(), &format!("2025-01-01-10-00-0{second}.flac"), 441);
        }
        let mut a = player(tmp.path(), CapturingOutput::default());
        let mut b = player(tmp.path(), CapturingOutput::default());

        for _ in 0..10 {
            assert_eq!(a.run_once().unwrap(), b.run_once().unwrap());
        }
    }

    #[test]
    fn test_errors_do_not_poison_the_loop() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("2025-01-01-10-00-00.flac"), b"garbage").unwrap();
        let mut player = player(tmp.path(), CapturingOutput::default());

        assert!(matches!(player.run_once(), Err(MurmurError::Codec(_))));

        fs::remove_file(tmp.path().join("2025-01-01-10-00-00.flac")).unwrap();
        write_recording(tmp.path(), "2025-01-01-10-00-01.flac", 441);
        assert!(matches!(player.run_once(), Ok(PlaybackStep::Played(_))));
    }

    #[test]
    fn test_output_failure_surfaces_as_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_recording(tmp.path(), "2025-01-01-10-00-00.flac", 441);
        let mut player = player(tmp.path(), FailingOutput);

        assert!(matches!(player.run_once(), Err(MurmurError::Device(_))));
    }

    #[test]
    fn test_missing_directory_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut player = player(&tmp.path().join("gone"), CapturingOutput::default());
        assert!(matches!(player.run_once(), Err(MurmurError::Io(_))));
    }
}
