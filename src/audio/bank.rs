use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use super::AudioError;

/// Sample rate and length of the stand-in used when an asset is missing.
const PLACEHOLDER_RATE: u32 = 22_050;
const PLACEHOLDER_SAMPLES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundId {
    /// Looped in the background, also used for open-water splashes.
    Rain,
    Thunder,
}

impl SoundId {
    #[allow(dead_code)]
    pub const ALL: [SoundId; 2] = [SoundId::Rain, SoundId::Thunder];

    pub fn file_name(self) -> &'static str {
        match self {
            SoundId::Rain => "rain.wav",
            SoundId::Thunder => "thunder.wav",
        }
    }
}

/// Decoded 16-bit PCM.
#[derive(Debug, Clone)]
pub struct Sound {
    pub samples: Arc<[i16]>,
    pub sample_rate: u32,
    pub channels: u16,
    /// True when this is the silent stand-in.
    pub placeholder: bool,
}

impl Sound {
    /// Short mono silence.
    pub fn silent() -> Self {
        Sound {
            samples: vec![0; PLACEHOLDER_SAMPLES].into(),
            sample_rate: PLACEHOLDER_RATE,
            channels: 1,
            placeholder: true,
        }
    }

    /// Play length in seconds.
    pub fn duration(&self) -> f64 {
        let frames = self.samples.len() / self.channels.max(1) as usize;
        frames as f64 / self.sample_rate.max(1) as f64
    }

    /// Read a WAV file, converting any integer or float format to i16.
    pub fn load(path: &Path) -> Result<Self, AudioError> {
        let decode = |source: hound::Error| AudioError::Decode {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = hound::WavReader::open(path).map_err(decode)?;
        let spec = reader.spec();

        let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Int, 1..=16) => {
                let shift = 16 - spec.bits_per_sample;
                reader
                    .samples::<i16>()
                    .map(|s| s.map(|v| v << shift))
                    .collect::<Result<_, _>>()
                    .map_err(decode)?
            }
            (hound::SampleFormat::Int, 17..=32) => {
                let shift = spec.bits_per_sample - 16;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| (v >> shift) as i16))
                    .collect::<Result<_, _>>()
                    .map_err(decode)?
            }
            (hound::SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
                .collect::<Result<_, _>>()
                .map_err(decode)?,
            (_, bits) => {
                return Err(AudioError::Format {
                    path: path.to_path_buf(),
                    bits,
                });
            }
        };

        Ok(Sound {
            samples: samples.into(),
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            placeholder: false,
        })
    }
}

/// The two sounds the scene needs, always present.
#[derive(Debug, Clone)]
pub struct SoundBank {
    rain: Sound,
    thunder: Sound,
}

impl Default for SoundBank {
    fn default() -> Self {
        SoundBank {
            rain: Sound::silent(),
            thunder: Sound::silent(),
        }
    }
}

impl SoundBank {
    /// Load assets from `dir` (or the working directory). Missing or broken
    /// files are replaced with silence and logged; this never fails.
    pub fn load(dir: Option<&Path>) -> Self {
        let dir = dir.map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let load = |id: SoundId| {
            let path = dir.join(id.file_name());
            if !path.exists() {
                info!(path = %path.display(), "sound not found, using silence");
                return Sound::silent();
            }
            match Sound::load(&path) {
                Ok(sound) => {
                    info!(path = %path.display(), seconds = sound.duration(), "loaded sound");
                    sound
                }
                Err(e) => {
                    warn!("{e}; using silence");
                    Sound::silent()
                }
            }
        };
        SoundBank {
            rain: load(SoundId::Rain),
            thunder: load(SoundId::Thunder),
        }
    }

    pub fn get(&self, id: SoundId) -> &Sound {
        match id {
            SoundId::Rain => &self.rain,
            SoundId::Thunder => &self.thunder,
        }
    }
}
