//! Spectrum peak detection over a recorded sequence
//!
//! Every group is transformed, the complex bins are summed across groups
//! and the magnitude of the sum forms the spectrum. The spectrum is
//! smoothed and then scanned for local maxima that rise far enough above
//! the preceding valley.

use super::fft::{FftEngine, FftError};
use crate::filters::smoothing::{smooth, SmoothingError};
use crate::sequence::{Metadata, SampleSequence};
use num_complex::Complex32;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Fft(#[from] FftError),

    #[error("Spectrum too short for peak detection: {0}")]
    Smoothing(#[from] SmoothingError),
}

/// Spectrum analyzer configuration
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Smoothing radius in bins applied before peak detection
    pub smoothing_radius: usize,

    /// Minimum rise of a peak above the last valley
    ///
    /// Magnitudes are summed, not averaged, across groups, so this is
    /// relative to the recording length.
    pub peak_threshold: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            smoothing_radius: 5,
            peak_threshold: 10.0,
        }
    }
}

/// Detected spectrum peak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Bin index within the spectrum
    pub bin: usize,

    /// `sample_rate * bin / group_capacity`, truncated
    pub frequency_hz: u64,

    /// Smoothed magnitude at the peak
    pub magnitude: f32,
}

impl Peak {
    fn new(bin: usize, magnitude: f32, metadata: &Metadata) -> Self {
        let frequency_hz =
            metadata.sample_rate() as u64 * bin as u64 / metadata.group_capacity() as u64;
        Self {
            bin,
            frequency_hz,
            magnitude,
        }
    }
}

impl fmt::Display for Peak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spectrum peak at {}Hz", self.frequency_hz)
    }
}

/// Peak detecting spectrum analyzer
pub struct SpectrumAnalyzer {
    config: AnalyzerConfig,
    fft_engine: Option<FftEngine>,
}

impl SpectrumAnalyzer {
    /// Create new spectrum analyzer
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            fft_engine: None,
        }
    }

    /// Get current configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// FFT engine planned for `fft_size`, replanned only when the size changes
    fn engine(&mut self, fft_size: usize) -> Result<&mut FftEngine, FftError> {
        let engine = match self.fft_engine.take() {
            Some(engine) if engine.fft_size() == fft_size => engine,
            _ => FftEngine::new(fft_size)?,
        };

        Ok(self.fft_engine.insert(engine))
    }

    /// Magnitude spectrum of the whole sequence
    ///
    /// # Returns
    /// `group_capacity / 2` magnitudes of the bin-wise complex sum over all groups
    pub fn spectrum(&mut self, seq: &SampleSequence<f32>) -> Result<Vec<f32>, AnalysisError> {
        let engine = self.engine(seq.metadata().group_capacity())?;
        let mut transformed_sum = vec![Complex32::new(0.0, 0.0); engine.num_bins()];

        for group in seq.groups() {
            let transformed = engine.transform_real(group)?;
            for (sum, bin) in transformed_sum.iter_mut().zip(transformed) {
                *sum += *bin;
            }
        }

        log::debug!(
            "Accumulated {} groups into {} bins",
            seq.group_count(),
            transformed_sum.len()
        );

        Ok(transformed_sum.iter().map(|c| c.norm()).collect())
    }

    /// Detect peaks in a magnitude spectrum
    ///
    /// # Arguments
    /// * `spectrum` - Raw magnitudes, one per bin
    /// * `metadata` - Parameters of the sequence the spectrum came from
    ///
    /// # Returns
    /// Peaks in ascending bin order
    pub fn find_peaks(
        &self,
        spectrum: &[f32],
        metadata: &Metadata,
    ) -> Result<Vec<Peak>, AnalysisError> {
        let smoothed = smooth(&spectrum.to_vec(), self.config.smoothing_radius)?;
        let threshold = self.config.peak_threshold;

        let mut peaks = Vec::new();
        let mut was_rising = true;
        let mut min = 0.0f32;
        let mut max = 0.0f32;

        for (bin, pair) in smoothed.windows(2).enumerate() {
            let (lhs, rhs) = (pair[0], pair[1]);
            let is_rising = lhs < rhs;

            if was_rising && !is_rising {
                was_rising = false;
                max = lhs;
                if max - min > threshold {
                    peaks.push(Peak::new(bin, lhs, metadata));
                } else {
                    log::trace!("Rejected minor peak at bin {} ({} over {})", bin, max, min);
                }
            } else if !was_rising && is_rising {
                was_rising = true;
                if max - min > threshold {
                    min = lhs;
                }
            }
        }

        log::debug!("Found {} peaks in {} bins", peaks.len(), smoothed.len());

        Ok(peaks)
    }

    /// Compute the spectrum of a sequence and detect its peaks
    pub fn analyze(&mut self, seq: &SampleSequence<f32>) -> Result<Vec<Peak>, AnalysisError> {
        let spectrum = self.spectrum(seq)?;
        self.find_peaks(&spectrum, seq.metadata())
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::generator::sine;
    use std::time::Duration;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn metadata() -> Metadata {
        // 128 bins of 31.25 Hz
        Metadata::new(8000, 1, 256).unwrap()
    }

    #[test]
    fn test_spectrum_length() {
        let seq = sine(metadata(), 1015.625, Duration::from_millis(96));
        let spectrum = SpectrumAnalyzer::default().spectrum(&seq).unwrap();
        assert_eq!(seq.group_count(), 3);
        assert_eq!(spectrum.len(), 128);
    }

    #[test]
    fn test_single_tone_single_group() {
        init_logger();
        let metadata = metadata();
        let seq = sine(metadata, 1015.625, Duration::from_millis(32));
        assert_eq!(seq.group_count(), 1);

        let peaks = SpectrumAnalyzer::default().analyze(&seq).unwrap();

        assert_eq!(peaks.len(), 1);
        let error = (peaks[0].frequency_hz as f64 - 1015.625).abs();
        assert!(error <= metadata.bin_width_hz(), "peak at {}", peaks[0]);
    }

    #[test]
    fn test_single_tone_across_groups() {
        init_logger();
        let metadata = metadata();
        let seq = sine(metadata, 1015.625, Duration::from_millis(96));

        let peaks = SpectrumAnalyzer::default().analyze(&seq).unwrap();

        assert_eq!(peaks.len(), 1);
        let error = (peaks[0].frequency_hz as f64 - 1015.625).abs();
        assert!(error <= metadata.bin_width_hz(), "peak at {}", peaks[0]);
    }

    #[test]
    fn test_two_tones() {
        init_logger();
        let metadata = metadata();
        let low = sine(metadata, 1015.625, Duration::from_millis(32));
        let high = sine(metadata, 2515.625, Duration::from_millis(32));

        let mut mixed = low.clone();
        for (sample, other) in mixed.iter_mut().zip(high.iter()) {
            *sample += *other;
        }

        let peaks = SpectrumAnalyzer::default().analyze(&mixed).unwrap();

        assert_eq!(peaks.len(), 2);
        assert!(peaks[0].bin < peaks[1].bin);
        assert!((peaks[0].frequency_hz as f64 - 1015.625).abs() <= metadata.bin_width_hz());
        assert!((peaks[1].frequency_hz as f64 - 2515.625).abs() <= metadata.bin_width_hz());
    }

    #[test]
    fn test_bin_centred_spike_reports_plateau_edge() {
        init_logger();
        // smoothing spreads a single bin over 11 equal bins; the scan stops
        // at the first one that does not rise
        let mut spectrum = vec![0.0f32; 128];
        spectrum[32] = 128.0;

        let peaks = SpectrumAnalyzer::default()
            .find_peaks(&spectrum, &metadata())
            .unwrap();

        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].bin, 27);
        assert_eq!(peaks[0].magnitude, 128.0 / 11.0);
        // 843.75 truncated, well over one bin below 1000 Hz
        assert_eq!(peaks[0].frequency_hz, 843);
    }

    #[test]
    fn test_bin_centred_tone_lands_on_plateau() {
        init_logger();
        let radius = AnalyzerConfig::default().smoothing_radius;
        let seq = sine(metadata(), 1000.0, Duration::from_millis(32));

        let peaks = SpectrumAnalyzer::default().analyze(&seq).unwrap();

        assert_eq!(peaks.len(), 1);
        assert!(
            (32 - radius..=32 + radius).contains(&peaks[0].bin),
            "peak at bin {}",
            peaks[0].bin
        );
    }

    #[test]
    fn test_silence_has_no_peaks() {
        init_logger();
        let mut seq = SampleSequence::new(metadata());
        seq.push(vec![0.0; 256]);

        let peaks = SpectrumAnalyzer::default().analyze(&seq).unwrap();
        assert!(peaks.is_empty());
    }

    #[test]
    fn test_frequency_truncates() {
        let peak = Peak::new(32, 1.0, &metadata());
        // 8000 * 32 / 256 = 1000
        assert_eq!(peak.frequency_hz, 1000);

        let peak = Peak::new(33, 1.0, &metadata());
        // 1031.25 truncated
        assert_eq!(peak.frequency_hz, 1031);
        assert_eq!(peak.to_string(), "spectrum peak at 1031Hz");
    }

    #[test]
    fn test_threshold_against_last_valley() {
        init_logger();
        let analyzer = SpectrumAnalyzer::new(AnalyzerConfig {
            smoothing_radius: 0,
            peak_threshold: 10.0,
        });
        // rise to 20 (peak), valley at 5, bump to 12 (7 above valley), fall
        let spectrum = [0.0, 20.0, 5.0, 12.0, 0.0, 0.0];
        let peaks = analyzer.find_peaks(&spectrum, &metadata()).unwrap();

        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].bin, 1);
        assert_eq!(peaks[0].magnitude, 20.0);
    }

    #[test]
    fn test_short_spectrum_is_configuration_error() {
        let analyzer = SpectrumAnalyzer::default();
        let result = analyzer.find_peaks(&[1.0; 8], &metadata());
        assert!(matches!(result, Err(AnalysisError::Smoothing(_))));
    }

    #[test]
    fn test_odd_group_capacity_rejected() {
        let mut seq = SampleSequence::new(Metadata::new(8000, 1, 255).unwrap());
        seq.push(vec![0.0; 255]);
        let result = SpectrumAnalyzer::default().spectrum(&seq);
        assert!(matches!(result, Err(AnalysisError::Fft(FftError::InvalidSize(255)))));
    }
}
