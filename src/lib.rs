//! Duration-preserving pitch shifting for audio files.
//!
//! The [`shift`] module holds the phase-vocoder pitch shifter, [`audio`] the
//! file I/O and inspection helpers around it, and [`config`] the settings
//! shared with the command-line tool.
//!
//! ```no_run
//! use spectral_shift::audio;
//! use spectral_shift::shift::pitch_shift;
//! use std::path::Path;
//!
//! let input = audio::read_audio_file(Path::new("song.mp3"))?;
//! let output = pitch_shift(&input, 12.0)?;
//! audio::write_wav_file(Path::new("song_up.wav"), &output, Default::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod audio;
pub mod config;
pub mod shift;
