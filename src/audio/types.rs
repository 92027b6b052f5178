use crate::shift::ShiftError;

/// Decoded audio, interleaved and normalized to the [-1, 1] range
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Interleaved samples (`L R L R ...` for stereo)
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of audio channels (1 or 2)
    pub channels: u16,
}

/// Output of a pitch shift. Same rate, channel count and length as the input.
pub type ShiftedAudioBuffer = AudioBuffer;

/// WAV sample encoding used when writing files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// 16-bit signed PCM, clamped
    #[default]
    Pcm16,
    /// 32-bit IEEE float
    Float32,
}

/// Errors that can occur during audio I/O and analysis
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// IO errors when reading/writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors during WAV file parsing or writing
    #[error("WAV error: {0}")]
    WavParse(String),

    /// Errors from the compressed-format decoder
    #[error("Decode error: {0}")]
    Decode(String),

    /// The file type is not one we can read
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Errors from sample-rate conversion
    #[error("Resample error: {0}")]
    Resample(String),

    /// Invalid parameter values
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Errors raised by the pitch shifter
    #[error(transparent)]
    Shift(#[from] ShiftError),
}

impl AudioBuffer {
    /// Creates a buffer, checking the sample rate, channel count and sample layout.
    ///
    /// # Errors
    /// * `ShiftError::MalformedBuffer` if the sample rate is zero, the channel
    ///   count is not 1 or 2, or the sample count is not a multiple of the
    ///   channel count
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Result<Self, ShiftError> {
        let buffer = AudioBuffer {
            samples,
            sample_rate,
            channels,
        };
        buffer.validate_shape()?;
        buffer.validate_layout()?;
        Ok(buffer)
    }

    /// Builds an interleaved buffer from per-channel sample vectors.
    ///
    /// All channels must have the same length.
    pub fn from_channels(channels: &[Vec<f32>], sample_rate: u32) -> Result<Self, ShiftError> {
        let count = u16::try_from(channels.len()).map_err(|_| {
            ShiftError::MalformedBuffer(format!("{} channels is not supported", channels.len()))
        })?;
        let frames = channels.first().map_or(0, Vec::len);
        if channels.iter().any(|ch| ch.len() != frames) {
            return Err(ShiftError::MalformedBuffer(
                "channels have different lengths".to_string(),
            ));
        }

        let mut samples = Vec::with_capacity(frames * channels.len());
        for i in 0..frames {
            for ch in channels {
                samples.push(ch[i]);
            }
        }

        AudioBuffer::new(samples, sample_rate, count)
    }

    /// Checks every invariant, including that the buffer is not empty.
    ///
    /// The checks run in a fixed order: sample rate and channel count, then
    /// emptiness, then the interleaving layout.
    pub fn validate(&self) -> Result<(), ShiftError> {
        self.validate_shape()?;
        if self.samples.is_empty() {
            return Err(ShiftError::EmptyBuffer);
        }
        self.validate_layout()
    }

    fn validate_shape(&self) -> Result<(), ShiftError> {
        if self.sample_rate == 0 {
            return Err(ShiftError::MalformedBuffer(
                "sample rate must be greater than zero".to_string(),
            ));
        }
        if !(1..=2).contains(&self.channels) {
            return Err(ShiftError::MalformedBuffer(format!(
                "channel count must be 1 or 2, got {}",
                self.channels
            )));
        }
        Ok(())
    }

    fn validate_layout(&self) -> Result<(), ShiftError> {
        if self.samples.len() % self.channels as usize != 0 {
            return Err(ShiftError::MalformedBuffer(format!(
                "{} samples is not a multiple of {} channels",
                self.samples.len(),
                self.channels
            )));
        }
        Ok(())
    }

    /// Number of sample frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate as f32
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Extracts one channel as a contiguous vector.
    ///
    /// Returns `None` if `index` is out of range.
    pub fn channel(&self, index: usize) -> Option<Vec<f32>> {
        let channels = self.channels as usize;
        if index >= channels {
            return None;
        }
        Some(
            self.samples
                .iter()
                .skip(index)
                .step_by(channels)
                .copied()
                .collect(),
        )
    }

    /// Splits the buffer into one vector per channel.
    pub fn deinterleave(&self) -> Vec<Vec<f32>> {
        (0..self.channels as usize)
            .filter_map(|ch| self.channel(ch))
            .collect()
    }

    /// Averages all channels into a single mono signal.
    pub fn to_mono(&self) -> Vec<f32> {
        let channels = self.channels.max(1) as usize;
        self.samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    }
}
