use crate::audio::OutputFormat;
use crate::shift::ShiftParams;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default location of the configuration file
pub const CONFIG_FILE: &str = "config.toml";

/// Settings shared by the library and the CLI
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shift: ShiftParams,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub waveform: WaveformConfig,
}

/// Input handling settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Sample rate every input is converted to before processing (0 keeps the native rate)
    pub target_sample_rate: u32,
}

/// Output file settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write 32-bit float WAV instead of 16-bit PCM
    pub float: bool,
}

/// Waveform summary settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveformConfig {
    /// Number of blocks in a waveform summary
    pub blocks: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            target_sample_rate: 44100,
        }
    }
}

impl Default for WaveformConfig {
    fn default() -> Self {
        WaveformConfig { blocks: 1000 }
    }
}

impl InputConfig {
    /// The rate to convert inputs to, if any
    pub fn target_rate(&self) -> Option<u32> {
        (self.target_sample_rate > 0).then_some(self.target_sample_rate)
    }
}

impl OutputConfig {
    pub fn format(&self) -> OutputFormat {
        if self.float {
            OutputFormat::Float32
        } else {
            OutputFormat::Pcm16
        }
    }
}

impl Config {
    /// Checks the values that the TOML schema cannot express
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.shift.validate()?;
        if self.waveform.blocks == 0 {
            return Err("waveform.blocks must be at least 1".into());
        }
        Ok(())
    }
}

/// Parse configuration from a TOML string
pub fn parse_config(contents: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let config: Config = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from config.toml
pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    load_config_from(Path::new(CONFIG_FILE))
}

/// Load configuration from a file, falling back to defaults if it does not exist
pub fn load_config_from(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    match File::open(path) {
        Ok(mut file) => {
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            tracing::debug!("Loaded configuration from {}", path.display());
            parse_config(&contents)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            // If file doesn't exist, return default config
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}
