//! Lossless compressed recordings: flacenc writes, claxon reads

use std::fs;
use std::path::Path;

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::error::Verify;
use flacenc::source::MemSource;
use murmur_core::{Clip, Codec};

use super::{CodecError, rescale_int};

const BITS_PER_SAMPLE: usize = 16;

/// Frames shorter than this are only legal as the last frame of a stream
const MIN_BLOCK_SIZE: usize = 16;
const BLOCK_SIZES: [usize; 4] = [4096, 4608, 3072, 2304];

/// Mono 16-bit FLAC files
#[derive(Debug, Default, Clone, Copy)]
pub struct FlacCodec;

impl FlacCodec {
    pub fn write(samples: &[i16], sample_rate: u32, path: &Path) -> Result<(), CodecError> {
        let pcm: Vec<i32> = samples.iter().map(|&s| i32::from(s)).collect();
        let bytes = encode_pcm(&pcm, 1, BITS_PER_SAMPLE, sample_rate)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Read any FLAC stream as interleaved 16-bit samples
    pub fn read(path: &Path) -> Result<Clip, CodecError> {
        let mut reader = claxon::FlacReader::open(path)?;
        let info = reader.streaminfo();
        let samples = reader
            .samples()
            .map(|s| s.map(|v| rescale_int(v, info.bits_per_sample)))
            .collect::<Result<Vec<i16>, _>>()?;
        Ok(Clip::new(samples, info.sample_rate, info.channels as u16))
    }
}

impl Codec for FlacCodec {
    fn extension(&self) -> &str {
        "flac"
    }

    fn encode(&self, samples: &[i16], sample_rate: u32, path: &Path) -> murmur_core::Result<()> {
        Ok(Self::write(samples, sample_rate, path)?)
    }

    fn decode(&self, path: &Path) -> murmur_core::Result<Clip> {
        Ok(Self::read(path)?)
    }
}

/// Fixed block size that leaves no undersized frame before the end.
/// Clips up to one block become a single frame.
fn block_size_for(frames: usize) -> Option<usize> {
    if frames < MIN_BLOCK_SIZE {
        return None;
    }
    if frames <= BLOCK_SIZES[0] {
        return Some(frames);
    }
    BLOCK_SIZES.into_iter().find(|size| {
        let tail = frames % size;
        tail == 0 || tail >= MIN_BLOCK_SIZE
    })
}

fn encode_pcm(
    pcm: &[i32],
    channels: usize,
    bits_per_sample: usize,
    sample_rate: u32,
) -> Result<Vec<u8>, CodecError> {
    let frames = pcm.len() / channels.max(1);
    let block_size = block_size_for(frames)
        .ok_or_else(|| CodecError::Unsupported(format!("{frames} frames cannot be framed as FLAC")))?;

    let config = flacenc::config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| CodecError::FlacEncode(e.to_string()))?;
    let source = MemSource::from_samples(pcm, channels, bits_per_sample, sample_rate as usize);
    let stream = flacenc::encode_with_fixed_block_size(&config, source, block_size)
        .map_err(|e| CodecError::FlacEncode(format!("{e:?}")))?;

    let mut sink = ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|e| CodecError::FlacEncode(e.to_string()))?;
    Ok(sink.as_slice().to_vec())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use murmur_core::MurmurError;

    use super::*;

    fn sawtooth(frames: usize) -> Vec<i16> {
        (0..frames).map(|i| ((i % 200) as i16 - 100) * 300).collect()
    }

    #[test]
    fn test_roundtrip_is_lossless_and_compressed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("clip.flac");
        let samples = sawtooth(44100);

        FlacCodec.encode(&samples, 44100, &path).unwrap();
        let clip = FlacCodec.decode(&path).unwrap();

        assert_eq!(clip.sample_rate, 44100);
        assert_eq!(clip.channels, 1);
        assert_eq!(clip.duration(), Duration::from_secs(1));
        assert_eq!(clip.samples, samples);
        let raw_bytes = samples.len() * 2;
        assert!(fs::metadata(&path).unwrap().len() < raw_bytes as u64 / 2);
    }

    #[test]
    fn test_partial_last_block_keeps_length() {
        // priming read plus three chunks at the default capture settings
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("take.flac");
        let samples = sawtooth(4410 + 3 * 11025);

        FlacCodec.encode(&samples, 44100, &path).unwrap();
        let clip = FlacCodec.decode(&path).unwrap();

        assert_eq!(clip.frames(), samples.len());
        assert_eq!(clip.samples, samples);
    }

    #[test]
    fn test_decodes_24_bit_stereo() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("wide.flac");
        let pcm: Vec<i32> = [8_388_607, -8_388_608, 256, -256].repeat(32);
        fs::write(&path, encode_pcm(&pcm, 2, 24, 48000).unwrap()).unwrap();

        let clip = FlacCodec.decode(&path).unwrap();
        assert_eq!(clip.channels, 2);
        assert_eq!(clip.sample_rate, 48000);
        assert_eq!(clip.frames(), 64);
        assert_eq!(&clip.samples[..4], &[32767, -32768, 1, -1]);
    }

    #[test]
    fn test_block_size_avoids_tiny_frames() {
        assert_eq!(block_size_for(10), None);
        assert_eq!(block_size_for(100), Some(100));
        assert_eq!(block_size_for(4096 * 3), Some(4096));
        assert_eq!(block_size_for(4410), Some(4096));
        assert_eq!(block_size_for(4096 + 5), Some(4608));
    }

    #[test]
    fn test_too_short_to_encode() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("blip.flac");
        assert!(matches!(
            FlacCodec.encode(&[1, 2, 3], 44100, &path),
            Err(MurmurError::Codec(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_garbage_file_is_codec_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.flac");
        fs::write(&path, b"not a flac file").unwrap();
        assert!(matches!(FlacCodec.decode(&path), Err(MurmurError::Codec(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            FlacCodec.decode(&tmp.path().join("gone.flac")),
            Err(MurmurError::Io(_))
        ));
    }
}
