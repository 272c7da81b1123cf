//! Sample Sequence - chunked audio buffering and spectrum peak detection
//!
//! Captured audio arrives one group per device callback. Groups are kept
//! in a `SampleSequence` that reads like one flat buffer, can be smoothed
//! with a sliding window and analyzed for frequency peaks.

pub mod audio;
pub mod filters;
pub mod sequence;
pub mod signal;
pub mod spectrum;

pub use filters::smooth;
pub use sequence::{Metadata, SampleSequence};
pub use spectrum::{Peak, SpectrumAnalyzer};
