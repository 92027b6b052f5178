use super::types::{AudioBuffer, AudioError, OutputFormat};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Reads and parses a WAV file, converting samples to normalized f32 values.
///
/// This function supports the following WAV formats:
/// - 32-bit float
/// - 16-bit integer
/// - 24-bit integer
/// - 32-bit integer
///
/// All integer formats are normalized to the [-1, 1] range.
///
/// # Arguments
/// * `path` - Path to the WAV file to read
///
/// # Returns
/// * `Result<AudioBuffer, AudioError>` - Parsed audio or an error
///
/// # Errors
/// * If the file cannot be read
/// * If the WAV format is unsupported
/// * If the file has more than two channels
pub fn read_wav_file(path: &Path) -> Result<AudioBuffer, AudioError> {
    let reader = WavReader::open(path).map_err(|e| AudioError::WavParse(e.to_string()))?;
    let spec = reader.spec();

    if !(1..=2).contains(&spec.channels) {
        return Err(AudioError::UnsupportedFormat(format!(
            "{} channel WAV files are not supported (mono or stereo only)",
            spec.channels
        )));
    }

    // Convert samples to f32, regardless of input format
    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .map(|s| s.map_err(|e| AudioError::WavParse(e.to_string())))
            .collect::<Result<Vec<f32>, AudioError>>()?,
        (SampleFormat::Int, 16) => reader
            .into_samples::<i16>()
            .map(|s| s.map_err(|e| AudioError::WavParse(e.to_string())))
            .map(|s| Ok(s? as f32 / 32768.0))
            .collect::<Result<Vec<f32>, AudioError>>()?,
        (SampleFormat::Int, 24) => reader
            .into_samples::<i32>()
            .map(|s| s.map_err(|e| AudioError::WavParse(e.to_string())))
            .map(|s| Ok(s? as f32 / 8388608.0))
            .collect::<Result<Vec<f32>, AudioError>>()?,
        (SampleFormat::Int, 32) => reader
            .into_samples::<i32>()
            .map(|s| s.map_err(|e| AudioError::WavParse(e.to_string())))
            .map(|s| Ok(s? as f32 / 2147483648.0))
            .collect::<Result<Vec<f32>, AudioError>>()?,
        _ => {
            return Err(AudioError::WavParse(format!(
                "Unsupported WAV format: {:?} {}-bit",
                spec.sample_format, spec.bits_per_sample
            )))
        }
    };

    Ok(AudioBuffer {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Writes a buffer to a WAV file.
///
/// `OutputFormat::Pcm16` clamps every sample to [-1, 1] before scaling, so
/// overshoot from processing clips instead of wrapping around.
///
/// # Errors
/// * If the buffer is malformed
/// * If the file cannot be created or written
pub fn write_wav_file(
    path: &Path,
    buffer: &AudioBuffer,
    format: OutputFormat,
) -> Result<(), AudioError> {
    buffer.validate()?;

    let (bits_per_sample, sample_format) = match format {
        OutputFormat::Pcm16 => (16, SampleFormat::Int),
        OutputFormat::Float32 => (32, SampleFormat::Float),
    };
    let spec = WavSpec {
        channels: buffer.channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample,
        sample_format,
    };

    let mut writer =
        WavWriter::create(path, spec).map_err(|e| AudioError::WavParse(e.to_string()))?;

    for &sample in &buffer.samples {
        let result = match format {
            OutputFormat::Pcm16 => writer.write_sample((sample.clamp(-1.0, 1.0) * 32767.0) as i16),
            OutputFormat::Float32 => writer.write_sample(sample),
        };
        result.map_err(|e| AudioError::WavParse(e.to_string()))?;
    }

    writer
        .finalize()
        .map_err(|e| AudioError::WavParse(e.to_string()))
}
