//! Sample-rate conversion shared by pitch shifting and playback

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("Resample init error: {0}")]
    Init(String),
    #[error("Resample error: {0}")]
    Process(String),
}

/// Resample planar channels from `from_rate` to `to_rate`.
///
/// The output is aligned with the input (the sinc delay is removed) and has
/// `round(len * to_rate / from_rate)` frames per channel.
pub fn resample_planar(
    channels: &[Vec<f32>],
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<Vec<f32>>, ResampleError> {
    let frames = channels.first().map_or(0, Vec::len);
    if from_rate == to_rate || frames == 0 {
        return Ok(channels.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, frames, channels.len())
        .map_err(|e| ResampleError::Init(e.to_string()))?;

    let delay = resampler.output_delay();
    let expected = (frames as f64 * ratio).round() as usize;

    let mut output = resampler
        .process(channels, None)
        .map_err(|e| ResampleError::Process(e.to_string()))?;
    let tail = resampler
        .process_partial(None::<&[Vec<f32>]>, None)
        .map_err(|e| ResampleError::Process(e.to_string()))?;

    for (channel, rest) in output.iter_mut().zip(tail) {
        channel.extend(rest);
        channel.drain(..delay.min(channel.len()));
        channel.resize(expected, 0.0);
    }
    Ok(output)
}

/// Mono convenience wrapper around [`resample_planar`]
pub fn resample_if_needed(
    samples: &[f32],
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<f32>, ResampleError> {
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }
    let input = vec![samples.to_vec()];
    Ok(resample_planar(&input, from_rate, to_rate)?
        .into_iter()
        .flatten()
        .collect())
}

/// Split interleaved samples into one vector per channel
pub fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let channels = channels.max(1);
    (0..channels)
        .map(|ch| samples.iter().skip(ch).step_by(channels).copied().collect())
        .collect()
}

pub fn interleave(planar: &[Vec<f32>]) -> Vec<f32> {
    let frames = planar.first().map_or(0, Vec::len);
    (0..frames)
        .flat_map(|i| planar.iter().map(move |ch| ch.get(i).copied().unwrap_or(0.0)))
        .collect()
}

/// Average interleaved frames down to one channel
pub fn to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
