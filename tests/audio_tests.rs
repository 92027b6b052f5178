// Audio I/O and analysis tests
//
// These tests cover the code around the pitch shifter:
// - WAV writing and reading in both output formats
// - Format dispatch and error handling for unreadable files
// - Sample-rate conversion
// - Dominant frequency detection
// - Waveform summaries
// - AudioBuffer construction and channel helpers

use approx::assert_abs_diff_eq;
use spectral_shift::audio::{self, AudioBuffer, AudioError, OutputFormat};
use spectral_shift::shift::ShiftError;
use std::path::Path;

use test_utils::{assert_frequency, mono_sine, rms, sine, stereo_sine, SAMPLE_RATE};

/// Test WAV round trip with 16-bit PCM output.
///
/// This test verifies:
/// - Format details survive writing and reading
/// - Samples come back within 16-bit quantization error
#[test]
fn test_wav_round_trip_pcm16() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    let buffer = stereo_sine(440.0, 660.0, 0.1);

    audio::write_wav_file(&path, &buffer, OutputFormat::Pcm16).unwrap();
    let loaded = audio::read_wav_file(&path).unwrap();

    assert_eq!(loaded.sample_rate, SAMPLE_RATE);
    assert_eq!(loaded.channels, 2);
    assert_eq!(loaded.samples.len(), buffer.samples.len());
    for (a, b) in buffer.samples.iter().zip(&loaded.samples) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-3);
    }
}

/// Test WAV round trip with float output, which is lossless.
#[test]
fn test_wav_round_trip_float() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mono.wav");
    let buffer = mono_sine(1000.0, 0.05);

    audio::write_wav_file(&path, &buffer, OutputFormat::Float32).unwrap();
    let loaded = audio::read_audio_file(&path).unwrap();

    assert_eq!(loaded, buffer);
}

/// Samples beyond full scale are clipped, not wrapped, in 16-bit output.
#[test]
fn test_pcm16_clipping() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hot.wav");
    let buffer = AudioBuffer::new(vec![1.5, -1.5, 0.0], SAMPLE_RATE, 1).unwrap();

    audio::write_wav_file(&path, &buffer, OutputFormat::Pcm16).unwrap();
    let loaded = audio::read_wav_file(&path).unwrap();

    assert!(loaded.samples[0] > 0.99);
    assert!(loaded.samples[1] < -0.99);
    assert_abs_diff_eq!(loaded.samples[2], 0.0);
}

/// Test audio error cases.
///
/// This test verifies:
/// - Missing files produce an error
/// - Unknown extensions are rejected before any decoding
/// - Empty buffers cannot be written
#[test]
fn test_audio_error_cases() {
    let result = audio::read_audio_file(Path::new("non_existent_file.wav"));
    assert!(result.is_err(), "Should return error for non-existent file");

    let result = audio::read_audio_file(Path::new("notes.txt"));
    assert!(matches!(result, Err(AudioError::UnsupportedFormat(_))));

    let dir = tempfile::tempdir().unwrap();
    let empty = AudioBuffer {
        samples: Vec::new(),
        sample_rate: SAMPLE_RATE,
        channels: 1,
    };
    let result = audio::write_wav_file(&dir.path().join("empty.wav"), &empty, OutputFormat::Pcm16);
    assert!(matches!(
        result,
        Err(AudioError::Shift(ShiftError::EmptyBuffer))
    ));
}

/// Garbage data with a known extension fails to decode instead of panicking.
#[test]
fn test_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.mp3");
    std::fs::write(&path, b"definitely not an mp3 stream").unwrap();

    assert!(audio::read_audio_file(&path).is_err());
}

/// Decode WAV streams through symphonia.
///
/// This test verifies:
/// - A stereo float file keeps its rate, length and samples
/// - A four-channel file keeps only its first two channels
/// - The hound reader rejects the four-channel file instead
#[cfg(feature = "decode")]
#[test]
fn test_decode_wav_streams() {
    let dir = tempfile::tempdir().unwrap();

    let stereo_path = dir.path().join("stereo.wav");
    let stereo_spec = hound::WavSpec {
        channels: 2,
        sample_rate: 22050,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&stereo_path, stereo_spec).unwrap();
    for _ in 0..10000 {
        writer.write_sample(0.25f32).unwrap();
        writer.write_sample(-0.5f32).unwrap();
    }
    writer.finalize().unwrap();

    let stereo = audio::decode_file(&stereo_path).unwrap();
    assert_eq!(stereo.channels, 2);
    assert_eq!(stereo.sample_rate, 22050);
    assert_eq!(stereo.samples.len(), 20000);
    assert_eq!(stereo.channel(0), Some(vec![0.25; 10000]));
    assert_eq!(stereo.channel(1), Some(vec![-0.5; 10000]));

    // Each channel holds a constant that identifies it
    let quad_path = dir.path().join("quad.wav");
    let quad_spec = hound::WavSpec {
        channels: 4,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&quad_path, quad_spec).unwrap();
    for _ in 0..1000 {
        for level in [1000i16, 2000, 3000, 4000] {
            writer.write_sample(level).unwrap();
        }
    }
    writer.finalize().unwrap();

    let quad = audio::decode_file(&quad_path).unwrap();
    assert_eq!(quad.channels, 2);
    assert_eq!(quad.sample_rate, SAMPLE_RATE);
    assert_eq!(quad.samples.len(), 2000);
    for frame in quad.samples.chunks_exact(2) {
        assert_abs_diff_eq!(frame[0], 1000.0 / 32768.0, epsilon = 1e-4);
        assert_abs_diff_eq!(frame[1], 2000.0 / 32768.0, epsilon = 1e-4);
    }

    assert!(matches!(
        audio::read_audio_file(&quad_path),
        Err(AudioError::UnsupportedFormat(_))
    ));
}

/// Sample-rate conversion scales the length and keeps the pitch.
#[test]
fn test_resample_buffer() {
    let buffer = mono_sine(440.0, 1.0);

    let down = audio::resample_buffer(&buffer, 22050).unwrap();
    assert_eq!(down.sample_rate, 22050);
    assert_eq!(down.frames(), 22050);
    assert_frequency(audio::dominant_frequency(&down).unwrap(), 440.0, 3.0);

    // Level is kept and the resampler delay is trimmed, so the signal starts
    // at the beginning of the output rather than after a stretch of silence
    assert_abs_diff_eq!(rms(&down.samples[2000..20000]), 0.5 / 2f32.sqrt(), epsilon = 0.02);
    assert!(rms(&down.samples[..200]) > 0.2);

    let up = audio::resample_buffer(&buffer, 48000).unwrap();
    assert_eq!(up.frames(), 48000);
    assert_frequency(audio::dominant_frequency(&up).unwrap(), 440.0, 3.0);

    let same = audio::resample_buffer(&buffer, SAMPLE_RATE).unwrap();
    assert_eq!(same, buffer);

    assert!(matches!(
        audio::resample_buffer(&buffer, 0),
        Err(AudioError::InvalidParams(_))
    ));
}

/// Dominant frequency of plain and mixed signals.
#[test]
fn test_dominant_frequency() {
    let buffer = mono_sine(440.0, 1.0);
    let freq = audio::dominant_frequency(&buffer).unwrap();
    assert_frequency(freq, 440.0, 1.0);

    let note = audio::frequency_to_note(freq).unwrap();
    assert_eq!(note.to_string().split(' ').next(), Some("A4"));

    // A quieter second partial does not move the peak
    let frames = SAMPLE_RATE as usize;
    let samples: Vec<f32> = sine(300.0, frames, 0.6)
        .iter()
        .zip(sine(1200.0, frames, 0.2))
        .map(|(a, b)| a + b)
        .collect();
    let mixed = AudioBuffer::new(samples, SAMPLE_RATE, 1).unwrap();
    assert_frequency(audio::dominant_frequency(&mixed).unwrap(), 300.0, 1.0);

    let tiny = AudioBuffer::new(vec![0.0; 2], SAMPLE_RATE, 1).unwrap();
    assert!(audio::dominant_frequency(&tiny).is_err());
}

/// Waveform summary of a half-scale sine.
#[test]
fn test_waveform_summary() {
    let buffer = mono_sine(100.0, 1.0);
    let summary = audio::waveform_summary(&buffer, 0, 100).unwrap();

    assert_eq!(summary.blocks.len(), 100);
    assert_eq!(summary.samples_per_block, 441);
    assert_eq!(summary.total_frames, 44100);
    assert_abs_diff_eq!(summary.peak(), 0.5, epsilon = 1e-3);
    for block in &summary.blocks {
        assert!(block.min <= block.max);
        assert_abs_diff_eq!(block.rms, 0.5 / 2f32.sqrt(), epsilon = 0.01);
    }

    // More blocks than frames collapses to one frame per block
    let short = AudioBuffer::new(vec![0.1, -0.2, 0.3], SAMPLE_RATE, 1).unwrap();
    let summary = audio::waveform_summary(&short, 0, 10).unwrap();
    assert_eq!(summary.blocks.len(), 3);
    assert_abs_diff_eq!(summary.blocks[1].min, -0.2);
}

#[test]
fn test_waveform_errors() {
    let buffer = mono_sine(100.0, 0.1);
    assert!(audio::waveform_summary(&buffer, 1, 10).is_err());
    assert!(audio::waveform_summary(&buffer, 0, 0).is_err());

    let stereo = stereo_sine(100.0, 200.0, 0.1);
    assert!(audio::waveform_summary(&stereo, 1, 10).is_ok());
}

/// AudioBuffer construction enforces the layout invariants.
#[test]
fn test_audio_buffer_invariants() {
    assert!(AudioBuffer::new(vec![0.0; 4], SAMPLE_RATE, 2).is_ok());
    assert!(AudioBuffer::new(Vec::new(), SAMPLE_RATE, 1).is_ok());
    assert!(matches!(
        AudioBuffer::new(vec![0.0; 3], SAMPLE_RATE, 2),
        Err(ShiftError::MalformedBuffer(_))
    ));
    assert!(AudioBuffer::new(vec![0.0; 3], 0, 1).is_err());
    assert!(AudioBuffer::new(vec![0.0; 3], SAMPLE_RATE, 3).is_err());
    assert!(AudioBuffer::new(vec![0.0; 3], SAMPLE_RATE, 0).is_err());

    assert!(AudioBuffer::from_channels(&[vec![0.0; 3], vec![0.0; 2]], SAMPLE_RATE).is_err());
    assert!(AudioBuffer::from_channels(&[], SAMPLE_RATE).is_err());
}

#[test]
fn test_channel_helpers() {
    let buffer =
        AudioBuffer::from_channels(&[vec![1.0, 2.0, 3.0], vec![-1.0, -2.0, -3.0]], 8000).unwrap();

    assert_eq!(buffer.samples, vec![1.0, -1.0, 2.0, -2.0, 3.0, -3.0]);
    assert_eq!(buffer.frames(), 3);
    assert_eq!(buffer.channel(1), Some(vec![-1.0, -2.0, -3.0]));
    assert_eq!(buffer.channel(2), None);
    assert_eq!(buffer.to_mono(), vec![0.0, 0.0, 0.0]);
    assert_eq!(buffer.deinterleave().len(), 2);
    assert_abs_diff_eq!(buffer.duration_secs(), 3.0 / 8000.0);
}
