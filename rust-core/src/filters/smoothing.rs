//! Sliding window (moving average) smoothing
//!
//! Each output sample is the mean of the input samples within `radius`
//! positions of it. At the edges the window shrinks instead of padding
//! or reflecting, so the first and last `radius` outputs average fewer
//! samples.

use crate::sequence::SampleSequence;
use num_traits::{Float, One, Zero};
use std::ops::{Index, IndexMut};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmoothingError {
    #[error("Smoothing window of {window_size} samples does not fit into {len} samples")]
    WindowTooLarge { window_size: usize, len: usize },
}

/// Fixed-size, randomly indexable container of float samples
pub trait Smoothable: Clone + Index<usize, Output = Self::Sample> + IndexMut<usize> {
    type Sample: Float;

    fn sample_count(&self) -> usize;
}

impl<T: Float> Smoothable for Vec<T> {
    type Sample = T;

    fn sample_count(&self) -> usize {
        self.len()
    }
}

impl<T: Float> Smoothable for SampleSequence<T> {
    type Sample = T;

    fn sample_count(&self) -> usize {
        self.len()
    }
}

/// Running state of one smoothing pass
struct Window<T> {
    front: usize,
    mid: usize,
    back: usize,
    /// Samples in the window, kept as a float so the mean needs no cast
    count: T,
    sum: T,
}

impl<T: Float> Window<T> {
    fn add(&mut self, sample: T) {
        self.sum = self.sum + sample;
        self.count = self.count + T::one();
    }

    fn remove(&mut self, sample: T) {
        self.sum = self.sum - sample;
        self.count = self.count - T::one();
    }

    fn mean(&self) -> T {
        self.sum / self.count
    }
}

/// Smooth a container with a moving average of `2 * radius + 1` samples
///
/// # Arguments
/// * `input` - Samples to smooth
/// * `radius` - Samples on each side of the output position
///
/// # Returns
/// A copy of `input` with every sample replaced by its window mean, or
/// `SmoothingError::WindowTooLarge` unless `2 * radius + 1 < len`.
pub fn smooth<C: Smoothable>(input: &C, radius: usize) -> Result<C, SmoothingError> {
    let len = input.sample_count();
    let window_size = 2 * radius + 1;

    if window_size >= len {
        return Err(SmoothingError::WindowTooLarge { window_size, len });
    }

    let mut smoothed = input.clone();
    let mut window = Window {
        front: 0,
        mid: 0,
        back: 0,
        count: C::Sample::zero(),
        sum: C::Sample::zero(),
    };

    // Preload the samples left of the first output
    while window.back < radius {
        window.add(input[window.back]);
        window.back += 1;
    }

    // Growing window
    while window.back < window_size {
        window.add(input[window.back]);
        smoothed[window.mid] = window.mean();
        window.mid += 1;
        window.back += 1;
    }

    // Full window
    while window.back < len {
        window.sum = window.sum - input[window.front] + input[window.back];
        smoothed[window.mid] = window.mean();
        window.front += 1;
        window.mid += 1;
        window.back += 1;
    }

    // Shrinking window
    while window.mid < len {
        window.remove(input[window.front]);
        smoothed[window.mid] = window.mean();
        window.front += 1;
        window.mid += 1;
    }

    Ok(smoothed)
}
