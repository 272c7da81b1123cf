//! FFT engine using realfft for real-valued signals
//!
//! One transform per sample group: `fft_size` real samples in,
//! `fft_size / 2` complex bins out (DC up to, but excluding, Nyquist).

use num_complex::Complex32;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FftError {
    #[error("FFT size must be a positive even number (found: {0})")]
    InvalidSize(usize),

    #[error("FFT processing failed: {0}")]
    Process(String),
}

/// FFT engine for real-valued signals
pub struct FftEngine {
    /// FFT size (number of real input samples)
    fft_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f32>>,

    /// Reusable input buffer
    input_buffer: Vec<f32>,

    /// Reusable output buffer (`fft_size / 2 + 1` bins including Nyquist)
    output_buffer: Vec<Complex32>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples, must be even)
    pub fn new(fft_size: usize) -> Result<Self, FftError> {
        if fft_size == 0 || fft_size % 2 != 0 {
            return Err(FftError::InvalidSize(fft_size));
        }

        let mut planner = RealFftPlanner::<f32>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        let input_buffer = r2c.make_input_vec();
        let output_buffer = r2c.make_output_vec();

        Ok(Self {
            fft_size,
            r2c,
            input_buffer,
            output_buffer,
        })
    }

    /// Transform real samples into `fft_size / 2` complex bins
    ///
    /// # Arguments
    /// * `signal` - Input signal (zero-padded if shorter than fft_size, truncated if longer)
    pub fn transform_real(&mut self, signal: &[f32]) -> Result<&[Complex32], FftError> {
        let copy_len = signal.len().min(self.fft_size);
        self.input_buffer[..copy_len].copy_from_slice(&signal[..copy_len]);
        self.input_buffer[copy_len..].fill(0.0);

        self.r2c
            .process(&mut self.input_buffer, &mut self.output_buffer)
            .map_err(|e| FftError::Process(e.to_string()))?;

        Ok(&self.output_buffer[..self.num_bins()])
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of bins returned by `transform_real`
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2
    }
}
