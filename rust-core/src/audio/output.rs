//! Audio playback using cpal
//!
//! Plays sequences on the default output device

use super::buffer::{DeviceSample, Handoff, PlaybackFeed};
use super::guard::AudioGuard;
use super::input::{list_devices, stream_config, AudioDeviceInfo, AudioError};
use crate::sequence::{Metadata, SampleSequence};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream};

/// Audio playback device
pub struct AudioPlayback<T: DeviceSample> {
    stream: Stream,
    feed: Handoff<PlaybackFeed<T>>,
    metadata: Metadata,
    device_info: AudioDeviceInfo,
    _guard: AudioGuard,
}

impl<T: DeviceSample> AudioPlayback<T> {
    /// Open the default output device
    ///
    /// # Arguments
    /// * `metadata` - Parameters of the sequences that will be played
    pub fn open(metadata: Metadata) -> Result<Self, AudioError> {
        let guard = AudioGuard::acquire()?;
        let host = guard.host()?;

        match host.output_devices() {
            Ok(devices) => {
                for device in list_devices(devices, false) {
                    log::info!("Available audio playback device: {}", device.name);
                }
            }
            Err(e) => log::warn!("Could not enumerate playback devices: {}", e),
        }

        let device = host
            .default_output_device()
            .ok_or(AudioError::NoDevice)?;

        Self::from_device(guard, device, metadata)
    }

    /// Open a specific output device
    pub fn from_device(
        guard: AudioGuard,
        device: Device,
        metadata: Metadata,
    ) -> Result<Self, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        let device_info = AudioDeviceInfo {
            name,
            sample_rate: metadata.sample_rate(),
            channels: metadata.channel_count(),
        };

        let feed = Handoff::new(PlaybackFeed::new());

        let callback_feed = feed.clone();
        let stream = device
            .build_output_stream_raw(
                &stream_config(&metadata),
                T::FORMAT,
                move |data: &mut cpal::Data, _: &cpal::OutputCallbackInfo| {
                    callback_feed.with(|feed| feed.fill(data.bytes_mut()));
                },
                move |err| {
                    log::error!("Audio output error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::Open(e.to_string()))?;

        if let Err(e) = stream.pause() {
            log::warn!("Could not pause new output stream: {}", e);
        }

        log::info!("Opened audio playback device: {}", device_info.name);

        Ok(Self {
            stream,
            feed,
            metadata,
            device_info,
            _guard: guard,
        })
    }

    /// Play a sequence, blocking for its duration
    ///
    /// Once the sequence runs out before the duration ends, the device
    /// plays silence.
    pub fn play(&mut self, seq: SampleSequence<T>) -> Result<(), AudioError> {
        if seq.metadata() != &self.metadata {
            return Err(AudioError::MetadataMismatch {
                expected: self.metadata,
                found: *seq.metadata(),
            });
        }

        let duration = seq.duration();
        self.feed.with(|feed| feed.load(seq));

        log::info!("playback for {}ms ...", duration.as_millis());

        self.stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))?;

        // block here for the duration of the playback
        std::thread::sleep(duration);

        self.stream
            .pause()
            .map_err(|e| AudioError::PauseStream(e.to_string()))?;

        self.feed.with(PlaybackFeed::clear);

        Ok(())
    }

    /// Get device information
    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }
}

/// List available audio output devices
pub fn list_output_devices() -> Result<Vec<AudioDeviceInfo>, AudioError> {
    let guard = AudioGuard::acquire()?;
    let host = guard.host()?;

    let devices = host
        .output_devices()
        .map_err(|e| AudioError::DeviceName(e.to_string()))?;

    Ok(list_devices(devices, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_devices() {
        let _ = env_logger::builder().is_test(true).try_init();

        // Just ensure it doesn't crash
        let _ = list_output_devices();
    }
}
