use super::types::{AudioBuffer, AudioError};
use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Nearest equal-tempered note to a frequency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteName {
    /// MIDI note number (69 = A4)
    pub midi_note: u8,
    /// Deviation from the note in cents, in [-50, 50]
    pub cents: f32,
}

impl NoteName {
    /// Pitch class name, e.g. "C#"
    pub fn name(&self) -> &'static str {
        NOTE_NAMES[(self.midi_note % 12) as usize]
    }

    /// Octave number in scientific pitch notation
    pub fn octave(&self) -> i32 {
        self.midi_note as i32 / 12 - 1
    }
}

impl std::fmt::Display for NoteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{} ({:+.0} cents)", self.name(), self.octave(), self.cents)
    }
}

/// Finds the strongest frequency in a buffer.
///
/// This function performs the following steps:
/// 1. Mixes all channels down to mono
/// 2. Applies a Hann window to the samples
/// 3. Performs FFT analysis
/// 4. Picks the largest bin below Nyquist and refines it with quadratic interpolation
///
/// # Arguments
/// * `buffer` - The audio to analyze
///
/// # Returns
/// * `Result<f32, AudioError>` - Dominant frequency in Hz
///
/// # Errors
/// * If the buffer is malformed
/// * If the buffer is too short to resolve a peak
pub fn dominant_frequency(buffer: &AudioBuffer) -> Result<f32, AudioError> {
    buffer.validate()?;

    let mono_samples = buffer.to_mono();
    if mono_samples.len() < 4 {
        return Err(AudioError::InvalidParams(format!(
            "Need at least 4 frames to find a frequency, got {}",
            mono_samples.len()
        )));
    }

    // Apply window function
    let windowed_samples = apply_hann_window(&mono_samples);

    // Perform FFT
    let spectrum = compute_fft(&windowed_samples);

    Ok(find_peak_frequency(&spectrum, buffer.sample_rate))
}

/// Maps a frequency to the nearest MIDI note (A4 = 440 Hz).
///
/// Returns `None` for non-positive frequencies or ones outside the MIDI range.
pub fn frequency_to_note(freq: f32) -> Option<NoteName> {
    if !freq.is_finite() || freq <= 0.0 {
        return None;
    }

    let midi = 12.0 * (freq / 440.0).log2() + 69.0;
    if !(0.0..=127.0).contains(&midi) {
        return None;
    }

    let midi_note = midi.round() as u8;
    Some(NoteName {
        midi_note,
        cents: (midi - midi_note as f32) * 100.0,
    })
}

/// Applies a Hann window function to the input samples.
///
/// The window function is: w(n) = 0.5 * (1 - cos(2π*n/(N-1)))
fn apply_hann_window(samples: &[f32]) -> Vec<f32> {
    let len = samples.len();
    samples
        .iter()
        .enumerate()
        .map(|(i, &sample)| {
            let window = 0.5 * (1.0 - (2.0 * PI * i as f32 / (len - 1) as f32).cos());
            sample * window
        })
        .collect()
}

fn compute_fft(samples: &[f32]) -> Vec<Complex<f32>> {
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(samples.len());

    let mut buffer: Vec<Complex<f32>> = samples.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft.process(&mut buffer);

    buffer
}

/// Locates the largest magnitude bin in (0, N/2) and interpolates its position.
fn find_peak_frequency(spectrum: &[Complex<f32>], sample_rate: u32) -> f32 {
    let freq_resolution = sample_rate as f32 / spectrum.len() as f32;
    let nyquist_bin = spectrum.len() / 2;

    let mut bin = 1;
    let mut peak = 0.0f32;
    for (k, value) in spectrum.iter().enumerate().take(nyquist_bin).skip(1) {
        let magnitude = value.norm();
        if magnitude > peak {
            peak = magnitude;
            bin = k;
        }
    }

    // Quadratic interpolation between the neighbouring bins
    let alpha = spectrum[bin - 1].norm();
    let beta = spectrum[bin].norm();
    let gamma = spectrum[bin + 1].norm();
    let denom = alpha - 2.0 * beta + gamma;
    let p = if denom.abs() > f32::EPSILON {
        (0.5 * (alpha - gamma) / denom).clamp(-0.5, 0.5)
    } else {
        0.0
    };

    (bin as f32 + p) * freq_resolution
}
