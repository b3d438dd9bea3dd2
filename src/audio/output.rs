use tracing::trace;

use super::{AudioError, Sound};

/// A device that can play sounds on numbered channels.
pub trait AudioOutput {
    /// Start `sound` on `channel`, replacing whatever was playing there.
    fn play(&mut self, channel: usize, sound: &Sound, volume: f32, looped: bool) -> Result<(), AudioError>;

    fn stop(&mut self, channel: usize);
}

/// Output that plays nothing. Used when no audio backend is compiled in or
/// the device could not be opened.
#[derive(Debug, Default)]
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn play(&mut self, channel: usize, sound: &Sound, volume: f32, looped: bool) -> Result<(), AudioError> {
        trace!(channel, volume, looped, seconds = sound.duration(), "play (null output)");
        Ok(())
    }

    fn stop(&mut self, channel: usize) {
        trace!(channel, "stop (null output)");
    }
}

#[cfg(feature = "rodio_backend")]
mod rodio_output {
    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
    use tracing::debug;

    use super::{AudioError, AudioOutput, Sound};

    /// Plays through the default system device.
    pub struct RodioOutput {
        // Dropping the stream silences every sink.
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sinks: Vec<Option<Sink>>,
    }

    impl RodioOutput {
        pub fn new(channels: usize) -> Result<Self, AudioError> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| AudioError::Output(e.to_string()))?;
            debug!(channels, "rodio output opened");
            Ok(RodioOutput {
                _stream: stream,
                handle,
                sinks: (0..channels).map(|_| None).collect(),
            })
        }
    }

    impl AudioOutput for RodioOutput {
        fn play(&mut self, channel: usize, sound: &Sound, volume: f32, looped: bool) -> Result<(), AudioError> {
            let slot = self.sinks.get_mut(channel).ok_or(AudioError::Channel(channel))?;
            let sink = Sink::try_new(&self.handle).map_err(|e| AudioError::Output(e.to_string()))?;
            let source = SamplesBuffer::new(sound.channels, sound.sample_rate, sound.samples.to_vec());
            if looped {
                sink.append(source.repeat_infinite());
            } else {
                sink.append(source);
            }
            sink.set_volume(volume);
            if let Some(previous) = slot.replace(sink) {
                previous.stop();
            }
            Ok(())
        }

        fn stop(&mut self, channel: usize) {
            if let Some(sink) = self.sinks.get_mut(channel).and_then(Option::take) {
                sink.stop();
            }
        }
    }
}

#[cfg(feature = "rodio_backend")]
pub use rodio_output::RodioOutput;
