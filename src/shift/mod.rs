/// Duration-preserving pitch shifting.
///
/// A shift by `s` semitones scales every frequency by `2^(s/12)`. The signal is
/// first time-stretched by that ratio with a phase vocoder, which changes its
/// length but not its pitch, and then resampled back to the original length,
/// which restores the duration and moves the pitch.
mod stft;
mod vocoder;

use crate::audio::{resample_to_len, AudioBuffer, ShiftedAudioBuffer};
use serde::Deserialize;
use stft::Stft;
use vocoder::time_stretch;

/// Largest shift in either direction, in semitones
pub const MAX_SEMITONES: f32 = 24.0;

/// Errors reported by the pitch shifter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShiftError {
    /// Semitone offset outside [-24, 24] or not a finite number
    #[error("shift must be between -24 and 24 semitones, got {semitones}")]
    InvalidRange { semitones: f32 },

    /// No samples to process
    #[error("audio buffer is empty")]
    EmptyBuffer,

    /// Sample layout does not match the declared channel count or sample rate
    #[error("malformed audio buffer: {0}")]
    MalformedBuffer(String),

    /// Invalid analysis parameters
    #[error("invalid shift parameters: {0}")]
    InvalidParams(String),
}

/// A validated semitone offset
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ShiftRequest(f32);

impl ShiftRequest {
    /// Creates a request, rejecting values outside [-24, 24].
    pub fn new(semitones: f32) -> Result<Self, ShiftError> {
        if !semitones.is_finite() || semitones.abs() > MAX_SEMITONES {
            return Err(ShiftError::InvalidRange { semitones });
        }
        Ok(ShiftRequest(semitones))
    }

    pub fn semitones(self) -> f32 {
        self.0
    }

    /// Frequency ratio `2^(semitones / 12)`
    pub fn ratio(self) -> f64 {
        2.0f64.powf(self.0 as f64 / 12.0)
    }

    pub fn is_identity(self) -> bool {
        self.0 == 0.0
    }
}

impl TryFrom<f32> for ShiftRequest {
    type Error = ShiftError;

    fn try_from(semitones: f32) -> Result<Self, Self::Error> {
        ShiftRequest::new(semitones)
    }
}

impl From<Preset> for ShiftRequest {
    fn from(preset: Preset) -> Self {
        ShiftRequest(preset.semitones() as f32)
    }
}

/// Common musical intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Preset {
    OctaveUp,
    OctaveDown,
    PerfectFourth,
    MajorThird,
    Tritone,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::OctaveUp,
        Preset::OctaveDown,
        Preset::PerfectFourth,
        Preset::MajorThird,
        Preset::Tritone,
    ];

    pub fn semitones(self) -> i32 {
        match self {
            Preset::OctaveUp => 12,
            Preset::OctaveDown => -12,
            Preset::PerfectFourth => 5,
            Preset::MajorThird => 4,
            Preset::Tritone => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Preset::OctaveUp => "+1 Octave",
            Preset::OctaveDown => "-1 Octave",
            Preset::PerfectFourth => "Perfect Fourth",
            Preset::MajorThird => "Major Third",
            Preset::Tritone => "Tritone",
        }
    }
}

/// STFT settings for the phase vocoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShiftParams {
    /// Frame size in samples (power of two)
    pub fft_size: usize,
    /// Distance between analysis frames in samples
    pub hop_length: usize,
}

impl Default for ShiftParams {
    fn default() -> Self {
        ShiftParams {
            fft_size: 2048,
            hop_length: 512,
        }
    }
}

impl ShiftParams {
    /// Validates the parameters
    ///
    /// # Returns
    /// * `Ok(())` if the parameters are valid
    /// * `Err(ShiftError::InvalidParams)` otherwise
    pub fn validate(&self) -> Result<(), ShiftError> {
        if !self.fft_size.is_power_of_two() || !(64..=16384).contains(&self.fft_size) {
            return Err(ShiftError::InvalidParams(format!(
                "fft_size must be a power of two between 64 and 16384, got {}",
                self.fft_size
            )));
        }
        if self.hop_length == 0 || self.hop_length > self.fft_size / 2 {
            return Err(ShiftError::InvalidParams(format!(
                "hop_length must be between 1 and {} (half of fft_size), got {}",
                self.fft_size / 2,
                self.hop_length
            )));
        }
        Ok(())
    }
}

/// Pitch shifter with fixed analysis parameters.
///
/// Holds no state between calls, so one instance can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct PitchShifter {
    params: ShiftParams,
}

impl PitchShifter {
    pub fn new(params: ShiftParams) -> Result<Self, ShiftError> {
        params.validate()?;
        Ok(PitchShifter { params })
    }

    pub fn params(&self) -> ShiftParams {
        self.params
    }

    /// Shifts the pitch of `buffer` while keeping its duration.
    ///
    /// The output has the same sample rate, channel count and number of
    /// samples as the input. A zero shift returns an exact copy.
    ///
    /// # Errors
    /// * `ShiftError::MalformedBuffer` if the buffer's layout is invalid
    /// * `ShiftError::EmptyBuffer` if there are no samples
    pub fn shift(
        &self,
        buffer: &AudioBuffer,
        request: ShiftRequest,
    ) -> Result<ShiftedAudioBuffer, ShiftError> {
        buffer.validate()?;

        if request.is_identity() {
            return Ok(buffer.clone());
        }

        let rate = 1.0 / request.ratio();
        let frames = buffer.frames();
        tracing::debug!(
            semitones = request.semitones(),
            rate,
            frames,
            channels = buffer.channels,
            "pitch shift started"
        );

        let stft = Stft::new(self.params.fft_size, self.params.hop_length);
        let channels: Vec<Vec<f32>> = buffer
            .deinterleave()
            .iter()
            .map(|channel| {
                let stretched = time_stretch(&stft, channel, rate);
                resample_to_len(&stretched, frames)
            })
            .collect();

        let shifted = AudioBuffer::from_channels(&channels, buffer.sample_rate)?;
        tracing::debug!(samples = shifted.samples.len(), "pitch shift finished");
        Ok(shifted)
    }
}

/// Shifts `buffer` by `semitones` using the default parameters.
///
/// # Errors
/// * `ShiftError::InvalidRange` if `semitones` is outside [-24, 24]
/// * `ShiftError::EmptyBuffer` or `ShiftError::MalformedBuffer` for bad input
pub fn pitch_shift(buffer: &AudioBuffer, semitones: f32) -> Result<ShiftedAudioBuffer, ShiftError> {
    let request = ShiftRequest::new(semitones)?;
    PitchShifter::default().shift(buffer, request)
}
