//! Sound for the pond: an ambient rain loop plus one-shot cues.
//!
//! - [`SoundBank`] loads the two WAV assets, falling back to silence
//! - [`Mixer`] hands cues to free channels and drops them when none are free
//! - [`AudioOutput`] is the device; [`NullOutput`] only logs, `RodioOutput`
//!   (feature `rodio_backend`) plays through the system mixer

mod bank;
mod mixer;
mod output;

use std::path::PathBuf;

pub use bank::{Sound, SoundBank, SoundId};
pub use mixer::{MIN_CHANNELS, Mixer, MixerSettings};
pub use output::{AudioOutput, NullOutput};
#[cfg(feature = "rodio_backend")]
pub use output::RodioOutput;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
    #[error("unsupported sample format in {}: {bits}-bit", path.display())]
    Format { path: PathBuf, bits: u16 },
    #[cfg_attr(not(feature = "rodio_backend"), allow(dead_code))]
    #[error("audio output unavailable: {0}")]
    Output(String),
    #[cfg_attr(not(feature = "rodio_backend"), allow(dead_code))]
    #[error("no such channel: {0}")]
    Channel(usize),
}
