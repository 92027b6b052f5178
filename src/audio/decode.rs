//! Compressed audio decoding using symphonia.

use super::types::{AudioBuffer, AudioError};
use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

fn decode_error(e: SymphoniaError) -> AudioError {
    AudioError::Decode(e.to_string())
}

/// Decodes an audio file of any format symphonia can probe (mp3, ogg, m4a, flac, wav).
///
/// Sources with more than two channels keep only the first two.
///
/// # Errors
/// * If the file cannot be opened
/// * If no decodable audio track is found
/// * If the stream reports no sample rate
pub fn decode_file(path: &Path) -> Result<AudioBuffer, AudioError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(decode_error)?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Decode("No supported audio track found".to_string()))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::Decode("Unknown sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(decode_error)?;

    let mut interleaved: Vec<f32> = Vec::new();
    let mut source_channels: Option<usize> = None;
    // Sample buffer plus its capacity in frames
    let mut sample_buf: Option<(SampleBuffer<f32>, usize)> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(decode_error(e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(msg)) => {
                tracing::warn!("Skipping undecodable packet: {}", msg);
                continue;
            }
            Err(e) => return Err(decode_error(e)),
        };

        let spec = *decoded.spec();
        source_channels.get_or_insert(spec.channels.count());

        let frames = decoded.capacity();
        let needs_alloc = sample_buf
            .as_ref()
            .map_or(true, |(_, capacity)| *capacity < frames);
        if needs_alloc {
            sample_buf = Some((SampleBuffer::<f32>::new(frames as u64, spec), frames));
        }
        if let Some((buf, _)) = sample_buf.as_mut() {
            buf.copy_interleaved_ref(decoded);
            interleaved.extend_from_slice(buf.samples());
        }
    }

    let source_channels = source_channels.unwrap_or(1);
    let channels = source_channels.min(2);
    let samples = if source_channels > 2 {
        tracing::warn!(
            "Source has {} channels, keeping the first two",
            source_channels
        );
        interleaved
            .chunks_exact(source_channels)
            .flat_map(|frame| frame[..2].iter().copied())
            .collect()
    } else {
        interleaved
    };

    tracing::debug!(
        "Decoded {} ({} Hz, {} channels, {} samples)",
        path.display(),
        sample_rate,
        channels,
        samples.len()
    );

    Ok(AudioBuffer {
        samples,
        sample_rate,
        channels: channels as u16,
    })
}
