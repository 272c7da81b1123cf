//! Spectral analysis with FFT

pub mod analysis;
pub mod fft;

pub use analysis::{AnalysisError, AnalyzerConfig, Peak, SpectrumAnalyzer};
pub use fft::{FftEngine, FftError};
