use crate::audio::MixerSettings;
use crate::render::{ColorMode, RenderMode};
use crate::sim::lightning::LightningSettings;
use crate::sim::weather::WeatherSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// User configuration loaded from config file.
/// All fields are optional: CLI flags override config, config overrides defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default render mode
    pub render: Option<RenderModeConfig>,
    /// Default color mode
    pub color: Option<ColorModeConfig>,
    /// Target FPS (1-120)
    pub fps: Option<u32>,
    /// Hide status bar
    pub clean: Option<bool>,
    /// Fixed seed for the simulation
    pub seed: Option<u64>,
    pub weather: WeatherConfig,
    pub lightning: LightningConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub interval_ticks: Option<u32>,
    pub change_probability: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LightningConfig {
    pub min_interval: Option<f64>,
    pub random_strike_chance: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sounds_dir: Option<PathBuf>,
    pub rain_volume: Option<f32>,
    pub splash_volume: Option<f32>,
    pub thunder_volume: Option<f32>,
    pub channels: Option<usize>,
}

impl Config {
    pub fn weather_settings(&self) -> WeatherSettings {
        let d = WeatherSettings::default();
        WeatherSettings {
            interval_ticks: self.weather.interval_ticks.unwrap_or(d.interval_ticks),
            change_probability: self.weather.change_probability.unwrap_or(d.change_probability),
        }
    }

    pub fn lightning_settings(&self) -> LightningSettings {
        let d = LightningSettings::default();
        LightningSettings {
            min_interval: self.lightning.min_interval.unwrap_or(d.min_interval),
            random_strike_chance: self
                .lightning
                .random_strike_chance
                .unwrap_or(d.random_strike_chance),
        }
    }

    pub fn mixer_settings(&self) -> MixerSettings {
        let d = MixerSettings::default();
        MixerSettings {
            channels: self.audio.channels.unwrap_or(d.channels),
            rain_volume: self.audio.rain_volume.unwrap_or(d.rain_volume).clamp(0.0, 1.0),
            splash_volume: self.audio.splash_volume.unwrap_or(d.splash_volume).clamp(0.0, 1.0),
            thunder_volume: self.audio.thunder_volume.unwrap_or(d.thunder_volume).clamp(0.0, 1.0),
        }
    }
}

/// Render mode names for config file (kebab-case friendly)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderModeConfig {
    HalfBlock,
    Ascii,
}

impl From<RenderModeConfig> for RenderMode {
    fn from(c: RenderModeConfig) -> Self {
        match c {
            RenderModeConfig::HalfBlock => RenderMode::HalfBlock,
            RenderModeConfig::Ascii => RenderMode::Ascii,
        }
    }
}

/// Color mode names for config file (kebab-case friendly)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorModeConfig {
    Ansi16,
    Ansi256,
    TrueColor,
}

impl From<ColorModeConfig> for ColorMode {
    fn from(c: ColorModeConfig) -> Self {
        match c {
            ColorModeConfig::Ansi16 => ColorMode::Ansi16,
            ColorModeConfig::Ansi256 => ColorMode::Ansi256,
            ColorModeConfig::TrueColor => ColorMode::TrueColor,
        }
    }
}

/// Get the config file path: ~/.config/nightpond/config.toml
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nightpond").join("config.toml"))
}

/// Load config from file. Returns default config if the file doesn't exist
/// or can't be used.
pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Config::default();
    }
    match read_config(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{e}; using defaults");
            Config::default()
        }
    }
}

pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_config(contents: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(contents)
}

/// Generate a default config file with all options commented out
pub fn default_config_string() -> String {
    r#"# nightpond configuration
# Use --show-config to see the active config file path.
# CLI flags override these settings.

# Default render mode: half-block, ascii
# render = "half-block"

# Default color mode: ansi16, ansi256, true-color
# color = "true-color"

# Target FPS (1-120)
# fps = 60

# Hide status bar
# clean = false

# Fixed seed; omit for a different pond every run
# seed = 42

[weather]
# Ticks between weather rolls
# interval_ticks = 300
# Chance that a roll changes the weather
# change_probability = 0.3

[lightning]
# Seconds between strikes
# min_interval = 15.0
# Chance per tick of a strike attempt
# random_strike_chance = 0.002

[audio]
# Directory holding rain.wav and thunder.wav
# sounds_dir = "/path/to/sounds"
# rain_volume = 0.3
# splash_volume = 1.0
# thunder_volume = 0.8
# Playback channels (min 3; channel 0 is the rain loop)
# channels = 4
"#
    .to_string()
}
