//! Signal generation for playback and analysis checks

pub mod generator;

pub use generator::{sine, sweep, SweepConfig, SweepMethod};
