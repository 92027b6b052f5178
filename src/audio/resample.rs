use super::types::{AudioBuffer, AudioError};
use rubato::{FftFixedIn, Resampler};
use std::f64::consts::PI;

/// Zero crossings of the sinc kernel on each side, at full bandwidth
const SINC_ZERO_CROSSINGS: f64 = 16.0;

/// Resamples a single channel to exactly `output_len` samples.
///
/// Uses Blackman-windowed sinc interpolation. When the signal is shortened the
/// kernel cutoff drops with the decimation factor so that content above the
/// new Nyquist frequency is filtered out instead of folding back.
///
/// An empty input yields `output_len` zeros.
pub fn resample_to_len(input: &[f32], output_len: usize) -> Vec<f32> {
    if output_len == 0 {
        return Vec::new();
    }
    if input.is_empty() {
        return vec![0.0; output_len];
    }
    if input.len() == output_len {
        return input.to_vec();
    }

    // Input samples advanced per output sample
    let step = input.len() as f64 / output_len as f64;
    let cutoff = (1.0 / step).min(1.0);
    let half_width = SINC_ZERO_CROSSINGS / cutoff;
    let last = input.len() as isize - 1;

    (0..output_len)
        .map(|i| {
            // Sample centers stay aligned at both ends of the signal
            let pos = (i as f64 + 0.5) * step - 0.5;
            let first = (pos - half_width).ceil().max(0.0) as isize;
            let end = ((pos + half_width).floor() as isize).min(last);

            let mut acc = 0.0f64;
            for j in first..=end {
                let x = j as f64 - pos;
                acc += input[j as usize] as f64 * kernel(x, cutoff, half_width);
            }
            acc as f32
        })
        .collect()
}

fn kernel(x: f64, cutoff: f64, half_width: f64) -> f64 {
    if x.abs() >= half_width {
        return 0.0;
    }
    let arg = PI * cutoff * x;
    let sinc = if arg.abs() < 1e-12 { 1.0 } else { arg.sin() / arg };
    cutoff * sinc * blackman((x / half_width + 1.0) * 0.5)
}

/// Blackman window evaluated at `u` in [0, 1]
fn blackman(u: f64) -> f64 {
    0.42 - 0.5 * (2.0 * PI * u).cos() + 0.08 * (4.0 * PI * u).cos()
}

/// Frames fed to the resampler per call
const CHUNK_SIZE: usize = 1024;
/// FFT sub-chunks per chunk
const SUB_CHUNKS: usize = 2;

/// Converts a whole buffer to a new sample rate, channel by channel.
///
/// The output has `round(frames * target_rate / sample_rate)` frames. The
/// resampler's delay is trimmed from the front so the output lines up with
/// the input.
///
/// # Errors
/// * If the buffer is malformed or empty
/// * If `target_rate` is zero
/// * If the resampler cannot be built for this pair of rates
pub fn resample_buffer(buffer: &AudioBuffer, target_rate: u32) -> Result<AudioBuffer, AudioError> {
    buffer.validate()?;
    if target_rate == 0 {
        return Err(AudioError::InvalidParams(
            "Target sample rate must be greater than zero".to_string(),
        ));
    }
    if target_rate == buffer.sample_rate {
        return Ok(buffer.clone());
    }

    let input = buffer.deinterleave();
    let input_frames = buffer.frames();
    let expected_output_frames = ((input_frames as f64 * target_rate as f64
        / buffer.sample_rate as f64)
        .round() as usize)
        .max(1);

    let mut resampler = FftFixedIn::<f32>::new(
        buffer.sample_rate as usize,
        target_rate as usize,
        CHUNK_SIZE,
        SUB_CHUNKS,
        input.len(),
    )
    .map_err(|e| AudioError::Resample(e.to_string()))?;

    let delay = resampler.output_delay();
    let needed = delay + expected_output_frames;

    tracing::debug!(
        "Resampling {} Hz -> {} Hz ({} -> {} frames, delay {})",
        buffer.sample_rate,
        target_rate,
        input_frames,
        expected_output_frames,
        delay
    );

    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(needed + CHUNK_SIZE); input.len()];
    let mut pos = 0;
    // Past the end of the input the chunks are zero-padded to flush the delay line
    while output[0].len() < needed {
        let frames_needed = resampler.input_frames_next();
        let chunk: Vec<Vec<f32>> = input
            .iter()
            .map(|channel| {
                let start = pos.min(channel.len());
                let end = (pos + frames_needed).min(channel.len());
                let mut data = channel[start..end].to_vec();
                data.resize(frames_needed, 0.0);
                data
            })
            .collect();

        let resampled = resampler
            .process(&chunk, None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        for (out, res) in output.iter_mut().zip(&resampled) {
            out.extend_from_slice(res);
        }

        pos += frames_needed;
    }

    let channels: Vec<Vec<f32>> = output
        .into_iter()
        .map(|channel| channel[delay..needed].to_vec())
        .collect();

    Ok(AudioBuffer::from_channels(&channels, target_rate)?)
}
