//! Waveform overview data for an external renderer.

use super::types::{AudioBuffer, AudioError};
use serde::Serialize;

/// Peak and level data for one block of frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WaveformBlock {
    pub min: f32,
    pub max: f32,
    pub rms: f32,
}

/// Block summary of one channel
#[derive(Debug, Clone, Default, Serialize)]
pub struct WaveformSummary {
    pub sample_rate: u32,
    /// Frames per block (the last block may be shorter)
    pub samples_per_block: usize,
    pub total_frames: usize,
    pub blocks: Vec<WaveformBlock>,
}

impl WaveformSummary {
    /// Largest absolute sample value across all blocks
    pub fn peak(&self) -> f32 {
        self.blocks
            .iter()
            .map(|b| b.min.abs().max(b.max.abs()))
            .fold(0.0f32, f32::max)
    }
}

/// Summarizes one channel of a buffer into at most `num_blocks` blocks.
///
/// # Errors
/// * If the buffer is malformed or empty
/// * If `channel` is out of range or `num_blocks` is zero
pub fn waveform_summary(
    buffer: &AudioBuffer,
    channel: usize,
    num_blocks: usize,
) -> Result<WaveformSummary, AudioError> {
    buffer.validate()?;
    if num_blocks == 0 {
        return Err(AudioError::InvalidParams(
            "Waveform needs at least one block".to_string(),
        ));
    }
    let samples = buffer.channel(channel).ok_or_else(|| {
        AudioError::InvalidParams(format!(
            "Channel {} does not exist (buffer has {})",
            channel, buffer.channels
        ))
    })?;

    let samples_per_block = samples.len().div_ceil(num_blocks).max(1);
    let blocks = samples.chunks(samples_per_block).map(compute_block).collect();

    Ok(WaveformSummary {
        sample_rate: buffer.sample_rate,
        samples_per_block,
        total_frames: samples.len(),
        blocks,
    })
}

fn compute_block(samples: &[f32]) -> WaveformBlock {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    let mut sum_sq = 0.0f32;
    for &s in samples {
        min = min.min(s);
        max = max.max(s);
        sum_sq += s * s;
    }
    WaveformBlock {
        min,
        max,
        rms: (sum_sq / samples.len() as f32).sqrt(),
    }
}
