/// Audio I/O and inspection for the pitch shifter.
///
/// This module provides functionality to:
/// - Read WAV files and decode compressed formats into an [`AudioBuffer`]
/// - Write processed buffers back out as WAV
/// - Convert sample rates
/// - Find the dominant frequency of a signal
/// - Summarize a waveform for display
mod analysis;
#[cfg(feature = "decode")]
mod decode;
mod resample;
mod types;
mod wav;
mod waveform;

pub use analysis::{dominant_frequency, frequency_to_note, NoteName};
#[cfg(feature = "decode")]
pub use decode::decode_file;
pub use resample::{resample_buffer, resample_to_len};
pub use types::{AudioBuffer, AudioError, OutputFormat, ShiftedAudioBuffer};
pub use wav::{read_wav_file, write_wav_file};
pub use waveform::{waveform_summary, WaveformBlock, WaveformSummary};

use std::path::Path;

/// File extensions accepted as input, matching the upload filter
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["wav", "mp3", "ogg", "m4a", "flac"];

/// Reads any supported audio file into a buffer.
///
/// WAV files go through hound; other formats are decoded with symphonia when
/// the `decode` feature is enabled.
///
/// # Errors
/// * If the extension is not supported
/// * If reading or decoding fails
pub fn read_audio_file(path: &Path) -> Result<AudioBuffer, AudioError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AudioError::UnsupportedFormat(format!(
            "'{}' (expected one of: {})",
            path.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        )));
    }

    if ext == "wav" {
        return read_wav_file(path);
    }

    #[cfg(feature = "decode")]
    {
        decode_file(path)
    }
    #[cfg(not(feature = "decode"))]
    {
        Err(AudioError::UnsupportedFormat(format!(
            "'{}' needs the `decode` feature",
            path.display()
        )))
    }
}
