use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spectral_shift::audio::{self, AudioBuffer, AudioError, OutputFormat};
use spectral_shift::config::{self, Config};
use spectral_shift::shift::{PitchShifter, Preset, ShiftParams, ShiftRequest};

/// Duration-preserving audio pitch shifter
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = config::CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shift the pitch of an audio file and write the result as WAV
    Shift(ShiftArgs),

    /// Show format details and the dominant frequency of an audio file
    Info(InfoArgs),

    /// Print a JSON waveform summary of an audio file
    Waveform(WaveformArgs),
}

/// Shift the pitch of an audio file
#[derive(Args)]
struct ShiftArgs {
    /// Path to the input audio file (wav, mp3, ogg, m4a, flac)
    #[arg(required = true)]
    input: PathBuf,

    /// Output WAV path [default: pitch_shifted_<N>st.wav next to the input]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pitch offset in semitones (-24 to +24)
    #[arg(
        short,
        long,
        allow_negative_numbers = true,
        conflicts_with = "preset",
        required_unless_present = "preset"
    )]
    semitones: Option<f32>,

    /// Use a preset interval instead of an explicit offset
    #[arg(short, long, value_enum)]
    preset: Option<Preset>,

    /// STFT frame size in samples
    #[arg(long)]
    fft_size: Option<usize>,

    /// STFT hop length in samples
    #[arg(long)]
    hop_length: Option<usize>,

    /// Write 32-bit float WAV instead of 16-bit PCM
    #[arg(long)]
    float: bool,
}

/// Show details about an audio file
#[derive(Args)]
struct InfoArgs {
    /// Path to the input audio file
    #[arg(required = true)]
    input: PathBuf,
}

/// Summarize the waveform of an audio file
#[derive(Args)]
struct WaveformArgs {
    /// Path to the input audio file
    #[arg(required = true)]
    input: PathBuf,

    /// Number of blocks in the summary [default: from config]
    #[arg(long)]
    blocks: Option<usize>,

    /// Channel to summarize (0 = left or mono)
    #[arg(long, default_value_t = 0)]
    channel: usize,
}

/// Build the default output path: `pitch_shifted_<N>st.wav` beside the input
fn default_output_path(input: &Path, semitones: f32) -> PathBuf {
    let name = format!("pitch_shifted_{}st.wav", semitones);
    match input.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Read an input file, failing early with a clear message if it is missing
fn load_input(path: &Path) -> Result<AudioBuffer, AudioError> {
    if !path.exists() {
        return Err(AudioError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Audio file not found: {}", path.display()),
        )));
    }
    audio::read_audio_file(path)
}

fn run_shift_command(args: &ShiftArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let request = match (args.semitones, args.preset) {
        (_, Some(preset)) => {
            tracing::info!("Using preset {} ({:+} st)", preset.label(), preset.semitones());
            ShiftRequest::from(preset)
        }
        (Some(semitones), None) => ShiftRequest::new(semitones)?,
        (None, None) => return Err("either --semitones or --preset is required".into()),
    };

    let params = ShiftParams {
        fft_size: args.fft_size.unwrap_or(config.shift.fft_size),
        hop_length: args.hop_length.unwrap_or(config.shift.hop_length),
    };
    let shifter = PitchShifter::new(params)?;

    let mut buffer = load_input(&args.input)?;
    tracing::info!(
        "Loaded {} ({} Hz, {} channel(s), {:.2}s)",
        args.input.display(),
        buffer.sample_rate,
        buffer.channels,
        buffer.duration_secs()
    );

    if let Some(rate) = config.input.target_rate() {
        if rate != buffer.sample_rate {
            buffer = audio::resample_buffer(&buffer, rate)?;
        }
    }

    let start_time = Instant::now();
    let shifted = shifter.shift(&buffer, request)?;
    let processing_time = start_time.elapsed();

    let format = if args.float {
        OutputFormat::Float32
    } else {
        config.output.format()
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input, request.semitones()));
    audio::write_wav_file(&output, &shifted, format)?;

    tracing::info!(
        "Shifted by {} st in {:.2}s",
        request.semitones(),
        processing_time.as_secs_f64()
    );
    println!("{}", output.display());

    Ok(())
}

fn run_info_command(args: &InfoArgs) -> Result<(), Box<dyn std::error::Error>> {
    let buffer = load_input(&args.input)?;
    let frequency = audio::dominant_frequency(&buffer)?;

    println!("File:        {}", args.input.display());
    println!("Sample rate: {} Hz", buffer.sample_rate);
    println!("Channels:    {}", buffer.channels);
    println!("Duration:    {:.2}s", buffer.duration_secs());
    match audio::frequency_to_note(frequency) {
        Some(note) => println!("Dominant:    {:.1} Hz ~ {}", frequency, note),
        None => println!("Dominant:    {:.1} Hz", frequency),
    }

    Ok(())
}

fn run_waveform_command(
    args: &WaveformArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let buffer = load_input(&args.input)?;
    let blocks = args.blocks.unwrap_or(config.waveform.blocks);
    let summary = audio::waveform_summary(&buffer, args.channel, blocks)?;

    let json = serde_json::to_string(&summary)?;
    io::stdout().write_all(json.as_bytes())?;

    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::load_config_from(&cli.config)?;

    match &cli.command {
        Commands::Shift(args) => run_shift_command(args, &config)?,
        Commands::Info(args) => run_info_command(args)?,
        Commands::Waveform(args) => run_waveform_command(args, &config)?,
    }

    Ok(())
}

fn main() {
    // Logs go to stderr so stdout stays usable for data
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spectral_shift=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run() {
        Ok(_) => {}
        Err(err) => {
            eprintln!("\nERROR: {}\n", err);
            if let Some(AudioError::Io(ref io_err)) = err.downcast_ref::<AudioError>() {
                if io_err.kind() == io::ErrorKind::NotFound {
                    eprintln!("Please check that:");
                    eprintln!("1. The file path is correct");
                    eprintln!("2. The file exists");
                    eprintln!("3. You have permission to read the file");
                }
            }
            process::exit(1);
        }
    }
}
