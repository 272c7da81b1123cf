//! Recording parameters shared by every group of a sequence

use thiserror::Error;

/// Lowest sample rate accepted; the millisecond duration formula divides by `sample_rate / 1000`
pub const MIN_SAMPLE_RATE: u32 = 1000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Sample rate must be at least 1000 Hz (found: {0} Hz)")]
    SampleRate(u32),

    #[error("Channel count must be at least 1")]
    ChannelCount,

    #[error("Group capacity must be at least 1 sample")]
    GroupCapacity,
}

/// Constant parameters a sequence was recorded with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    sample_rate: u32,
    channel_count: u16,
    group_capacity: usize,
}

impl Metadata {
    /// Create validated metadata
    ///
    /// # Arguments
    /// * `sample_rate` - Sampling frequency in Hz
    /// * `channel_count` - Number of interleaved channels (1 mono, 2 stereo)
    /// * `group_capacity` - Samples delivered per capture/playback callback
    pub fn new(
        sample_rate: u32,
        channel_count: u16,
        group_capacity: usize,
    ) -> Result<Self, MetadataError> {
        if sample_rate < MIN_SAMPLE_RATE {
            return Err(MetadataError::SampleRate(sample_rate));
        }
        if channel_count == 0 {
            return Err(MetadataError::ChannelCount);
        }
        if group_capacity == 0 {
            return Err(MetadataError::GroupCapacity);
        }

        Ok(Self {
            sample_rate,
            channel_count,
            group_capacity,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    pub fn group_capacity(&self) -> usize {
        self.group_capacity
    }

    /// Width of one frequency bin in Hz for a transform over one group
    pub fn bin_width_hz(&self) -> f64 {
        self.sample_rate as f64 / self.group_capacity as f64
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channel_count: 1,
            group_capacity: 4096,
        }
    }
}
