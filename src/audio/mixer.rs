use tracing::{debug, trace, warn};

use super::{AudioOutput, SoundBank, SoundId};
use crate::sim::Cue;

/// Channel that carries the ambient loop and nothing else.
pub const AMBIENT_CHANNEL: usize = 0;
/// Thunder's preferred channel; it borrows any other free one if busy.
const THUNDER_CHANNEL: usize = 1;
/// Splashes only ever use this channel and are skipped while it is busy.
const SPLASH_CHANNEL: usize = 2;
pub const MIN_CHANNELS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixerSettings {
    pub channels: usize,
    /// Ambient loop.
    pub rain_volume: f32,
    /// Open-water splash one-shots.
    pub splash_volume: f32,
    pub thunder_volume: f32,
}

impl Default for MixerSettings {
    fn default() -> Self {
        MixerSettings {
            channels: 4,
            rain_volume: 0.3,
            splash_volume: 1.0,
            thunder_volume: 0.8,
        }
    }
}

/// Routes cues to a fixed pool of channels.
///
/// A channel is busy until the sound started on it has had time to finish.
/// Cues that find no free channel are dropped, never queued.
pub struct Mixer {
    output: Box<dyn AudioOutput>,
    bank: SoundBank,
    settings: MixerSettings,
    busy_until: Vec<f64>,
    ambient_playing: bool,
}

impl Mixer {
    pub fn new(output: Box<dyn AudioOutput>, bank: SoundBank, settings: MixerSettings) -> Self {
        let channels = settings.channels.max(MIN_CHANNELS);
        Mixer {
            output,
            bank,
            settings: MixerSettings { channels, ..settings },
            busy_until: vec![f64::NEG_INFINITY; channels],
            ambient_playing: false,
        }
    }

    pub fn start_ambient(&mut self) {
        if self.ambient_playing {
            return;
        }
        let sound = self.bank.get(SoundId::Rain);
        if sound.placeholder {
            debug!("no rain asset, ambient loop is silent");
        }
        match self
            .output
            .play(AMBIENT_CHANNEL, sound, self.settings.rain_volume, true)
        {
            Ok(()) => {
                self.ambient_playing = true;
                self.busy_until[AMBIENT_CHANNEL] = f64::INFINITY;
            }
            Err(e) => warn!("ambient rain not started: {e}"),
        }
    }

    pub fn stop_ambient(&mut self) {
        if self.ambient_playing {
            self.output.stop(AMBIENT_CHANNEL);
            self.ambient_playing = false;
            self.busy_until[AMBIENT_CHANNEL] = f64::NEG_INFINITY;
        }
    }

    #[allow(dead_code)]
    pub fn ambient_playing(&self) -> bool {
        self.ambient_playing
    }

    /// Fire-and-forget. Returns whether the cue actually started.
    pub fn play(&mut self, cue: Cue, now: f64) -> bool {
        let (id, volume) = match cue {
            Cue::RainSplash => (SoundId::Rain, self.settings.splash_volume),
            Cue::Thunder => (SoundId::Thunder, self.settings.thunder_volume),
        };
        let Some(channel) = self.free_channel(cue, now) else {
            trace!(?cue, "no free channel, cue dropped");
            return false;
        };

        let sound = self.bank.get(id);
        match self.output.play(channel, sound, volume, false) {
            Ok(()) => {
                self.busy_until[channel] = now + sound.duration();
                true
            }
            Err(e) => {
                debug!(?cue, channel, "cue dropped: {e}");
                false
            }
        }
    }

    fn free_channel(&self, cue: Cue, now: f64) -> Option<usize> {
        let free = |c: usize| self.busy_until[c] <= now;
        match cue {
            Cue::RainSplash => free(SPLASH_CHANNEL).then_some(SPLASH_CHANNEL),
            Cue::Thunder => {
                if free(THUNDER_CHANNEL) {
                    return Some(THUNDER_CHANNEL);
                }
                (0..self.busy_until.len())
                    .filter(|&c| c != AMBIENT_CHANNEL)
                    .find(|&c| free(c))
            }
        }
    }
}

impl Drop for Mixer {
    fn drop(&mut self) {
        self.stop_ambient();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioError, Sound};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<(usize, bool)>>>;
    type Volumes = Arc<Mutex<Vec<f32>>>;

    /// Records (channel, looped) for every successful play.
    struct Recording {
        log: Log,
        volumes: Volumes,
        fail: bool,
    }

    impl AudioOutput for Recording {
        fn play(&mut self, channel: usize, _sound: &Sound, volume: f32, looped: bool) -> Result<(), AudioError> {
            if self.fail {
                return Err(AudioError::Output("device gone".into()));
            }
            self.log.lock().unwrap().push((channel, looped));
            self.volumes.lock().unwrap().push(volume);
            Ok(())
        }

        fn stop(&mut self, _channel: usize) {}
    }

    fn mixer(fail: bool) -> (Mixer, Log) {
        let log = Log::default();
        let output = Recording {
            log: log.clone(),
            volumes: Volumes::default(),
            fail,
        };
        let mixer = Mixer::new(Box::new(output), SoundBank::default(), MixerSettings::default());
        (mixer, log)
    }

    #[test]
    fn ambient_loop_takes_channel_zero_once() {
        let (mut mixer, log) = mixer(false);
        mixer.start_ambient();
        mixer.start_ambient();
        assert!(mixer.ambient_playing());
        assert_eq!(*log.lock().unwrap(), vec![(AMBIENT_CHANNEL, true)]);
        mixer.stop_ambient();
        assert!(!mixer.ambient_playing());
    }

    #[test]
    fn splash_is_dropped_while_its_channel_is_busy() {
        let (mut mixer, log) = mixer(false);
        assert!(mixer.play(Cue::RainSplash, 0.0));
        assert!(!mixer.play(Cue::RainSplash, 0.001));
        let later = Sound::silent().duration() + 0.001;
        assert!(mixer.play(Cue::RainSplash, later));
        assert_eq!(*log.lock().unwrap(), vec![(SPLASH_CHANNEL, false), (SPLASH_CHANNEL, false)]);
    }

    #[test]
    fn thunder_borrows_a_free_channel_but_never_the_ambient_one() {
        let (mut mixer, log) = mixer(false);
        mixer.start_ambient();
        assert!(mixer.play(Cue::Thunder, 0.0));
        assert!(mixer.play(Cue::Thunder, 0.0));
        assert!(mixer.play(Cue::Thunder, 0.0));
        // 0 is ambient, 1..=3 now busy
        assert!(!mixer.play(Cue::Thunder, 0.0));

        let channels: Vec<usize> = log.lock().unwrap().iter().map(|(c, _)| *c).collect();
        assert_eq!(channels, vec![AMBIENT_CHANNEL, THUNDER_CHANNEL, 2, 3]);
    }

    #[test]
    fn output_errors_degrade_to_a_skipped_cue() {
        let (mut mixer, log) = mixer(true);
        mixer.start_ambient();
        assert!(!mixer.ambient_playing());
        assert!(!mixer.play(Cue::Thunder, 0.0));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn channel_count_has_a_floor() {
        let log = Log::default();
        let output = Recording {
            log,
            volumes: Volumes::default(),
            fail: false,
        };
        let settings = MixerSettings {
            channels: 1,
            ..MixerSettings::default()
        };
        let mut mixer = Mixer::new(Box::new(output), SoundBank::default(), settings);
        assert!(mixer.play(Cue::RainSplash, 0.0));
    }

    #[test]
    fn splashes_and_ambient_loop_have_separate_volumes() {
        let volumes = Volumes::default();
        let output = Recording {
            log: Log::default(),
            volumes: volumes.clone(),
            fail: false,
        };
        let mut mixer = Mixer::new(Box::new(output), SoundBank::default(), MixerSettings::default());
        mixer.start_ambient();
        assert!(mixer.play(Cue::RainSplash, 0.0));
        assert!(mixer.play(Cue::Thunder, 0.0));
        assert_eq!(*volumes.lock().unwrap(), vec![0.3, 1.0, 0.8]);
    }
}
