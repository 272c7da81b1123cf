//! Audio capture using cpal
//!
//! Records fixed-length sequences from the default input device

use super::buffer::{ingest, DeviceSample, Handoff};
use super::guard::AudioGuard;
use crate::sequence::{Metadata, SampleSequence};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, Stream, StreamConfig};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to initialize audio subsystem: {0}")]
    Init(String),

    #[error("No audio device found")]
    NoDevice,

    #[error("Failed to get device name: {0}")]
    DeviceName(String),

    #[error("Failed to open audio: {0}")]
    Open(String),

    #[error("Failed to play stream: {0}")]
    PlayStream(String),

    #[error("Failed to pause stream: {0}")]
    PauseStream(String),

    #[error("Sequence recorded with {found:?} does not match device opened with {expected:?}")]
    MetadataMismatch { expected: Metadata, found: Metadata },
}

/// Audio device information
#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Stream configuration delivering one group per callback
pub(super) fn stream_config(metadata: &Metadata) -> StreamConfig {
    let frames = metadata.group_capacity() / metadata.channel_count() as usize;
    StreamConfig {
        channels: metadata.channel_count(),
        sample_rate: cpal::SampleRate(metadata.sample_rate()),
        buffer_size: BufferSize::Fixed(frames.max(1) as u32),
    }
}

/// Audio capture device
pub struct AudioCapture<T: DeviceSample> {
    stream: Stream,
    recording: Handoff<SampleSequence<T>>,
    device_info: AudioDeviceInfo,
    _guard: AudioGuard,
}

impl<T: DeviceSample> AudioCapture<T> {
    /// Open the default input device
    ///
    /// # Arguments
    /// * `metadata` - Sample rate, channel count and group size to request
    pub fn open(metadata: Metadata) -> Result<Self, AudioError> {
        let guard = AudioGuard::acquire()?;
        let host = guard.host()?;

        match host.input_devices() {
            Ok(devices) => {
                for device in list_devices(devices, true) {
                    log::info!("Available audio capture device: {}", device.name);
                }
            }
            Err(e) => log::warn!("Could not enumerate capture devices: {}", e),
        }

        let device = host
            .default_input_device()
            .ok_or(AudioError::NoDevice)?;

        Self::from_device(guard, device, metadata)
    }

    /// Open a specific input device
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

        let recording = Handoff::new(SampleSequence::new(metadata));

        let callback_recording = recording.clone();
        let stream = device
            .build_input_stream_raw(
                &stream_config(&metadata),
                T::FORMAT,
                move |data: &cpal::Data, _: &cpal::InputCallbackInfo| {
                    callback_recording.with(|seq| ingest(seq, data.bytes()));
                },
                move |err| {
                    log::error!("Audio input error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::Open(e.to_string()))?;

        // some backends start streams on creation
        if let Err(e) = stream.pause() {
            log::warn!("Could not pause new input stream: {}", e);
        }

        log::info!("Opened audio capture device: {}", device_info.name);

        Ok(Self {
            stream,
            recording,
            device_info,
            _guard: guard,
        })
    }

    /// Record for `duration`, blocking the calling thread
    ///
    /// # Returns
    /// Everything captured while the stream ran
    pub fn record(&mut self, duration: Duration) -> Result<SampleSequence<T>, AudioError> {
        log::info!("recording for {}ms ...", duration.as_millis());

        self.stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))?;

        // block here for the duration of the recording
        std::thread::sleep(duration);

        self.stream
            .pause()
            .map_err(|e| AudioError::PauseStream(e.to_string()))?;

        Ok(self.recording.with(SampleSequence::take))
    }

    /// Get device information
    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }
}

pub(super) fn list_devices<I>(devices: I, input: bool) -> Vec<AudioDeviceInfo>
where
    I: Iterator<Item = Device>,
{
    let mut infos = Vec::new();

    for device in devices {
        let config = if input {
            device.default_input_config()
        } else {
            device.default_output_config()
        };

        if let (Ok(name), Ok(config)) = (device.name(), config) {
            infos.push(AudioDeviceInfo {
                name,
                sample_rate: config.sample_rate().0,
                channels: config.channels(),
            });
        }
    }

    infos
}

/// List available audio input devices
pub fn list_input_devices() -> Result<Vec<AudioDeviceInfo>, AudioError> {
    let guard = AudioGuard::acquire()?;
    let host = guard.host()?;

    let devices = host
        .input_devices()
        .map_err(|e| AudioError::DeviceName(e.to_string()))?;

    Ok(list_devices(devices, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_devices() {
        let _ = env_logger::builder().is_test(true).try_init();

        // Just ensure it doesn't crash
        let _ = list_input_devices();
    }

    #[test]
    fn test_stream_config_uses_frames() {
        let metadata = Metadata::new(48000, 2, 4096).unwrap();
        let config = stream_config(&metadata);

        assert_eq!(config.channels, 2);
        assert_eq!(config.sample_rate.0, 48000);
        assert_eq!(config.buffer_size, BufferSize::Fixed(2048));
    }

    #[test]
    fn test_error_carries_host_text() {
        let err = AudioError::Open("device busy".to_string());
        assert_eq!(err.to_string(), "Failed to open audio: device busy");
    }
}
