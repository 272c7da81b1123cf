//! Sample filtering

pub mod smoothing;

pub use smoothing::{smooth, Smoothable, SmoothingError};
