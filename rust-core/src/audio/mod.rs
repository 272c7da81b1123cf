//! Audio capture and playback with cpal

pub mod buffer;
pub mod guard;
pub mod input;
pub mod output;

pub use buffer::{DeviceSample, Handoff, PlaybackFeed};
pub use guard::AudioGuard;
pub use input::{list_input_devices, AudioCapture, AudioDeviceInfo, AudioError};
pub use output::{list_output_devices, AudioPlayback};
