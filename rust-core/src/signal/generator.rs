//! Synthetic test signals
//!
//! Pure tones and stepped frequency sweeps, generated one whole group at
//! a time so they can be played back or analyzed like a recording.

use crate::sequence::{Metadata, SampleSequence};
use std::f64::consts::PI;
use std::time::Duration;

/// Sweep parameters
#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    /// Frequency of the first group in Hz
    pub min_frequency: f64,

    /// Sweep stops before reaching this frequency
    pub max_frequency: f64,

    /// Frequency multiplier from one group to the next (> 1)
    pub factor: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            min_frequency: 20.0,
            max_frequency: 20000.0,
            factor: 1.1,
        }
    }
}

/// How a sweep keeps (or does not keep) phase across frequency steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepMethod {
    /// `sin(2π f t)` with a shared time base; jumps at every step
    Naive,

    /// Shared time base plus a phase offset recomputed at every step
    TimeAccumulator,

    /// Running phase incremented by `2π f / sample_rate` per sample
    PhaseAccumulator,
}

/// Sine tone filling whole groups for `duration`
///
/// # Arguments
/// * `metadata` - Recording parameters of the generated sequence
/// * `frequency` - Tone frequency in Hz
/// * `duration` - Length; truncated to whole groups
pub fn sine(metadata: Metadata, frequency: f64, duration: Duration) -> SampleSequence<f32> {
    let capacity = metadata.group_capacity();
    let total = metadata.sample_rate() as u128 * duration.as_millis() / 1000;
    let group_count = (total / capacity as u128) as usize;
    let dt = 1.0 / metadata.sample_rate() as f64;

    let mut seq = SampleSequence::new(metadata);
    let mut n = 0u64;
    for _ in 0..group_count {
        let group = (0..capacity)
            .map(|_| {
                let value = (2.0 * PI * frequency * n as f64 * dt).sin() as f32;
                n += 1;
                value
            })
            .collect();
        seq.push(group);
    }

    seq
}

/// Stepped sweep, one group per frequency
pub fn sweep(metadata: Metadata, config: SweepConfig, method: SweepMethod) -> SampleSequence<f32> {
    let capacity = metadata.group_capacity();
    let dt = 1.0 / metadata.sample_rate() as f64;

    let mut seq = SampleSequence::new(metadata);

    // time accumulator [s]
    let mut t = 0.0f64;
    // phase continuity offset
    let mut phi_offset = 0.0f64;
    // phase accumulator
    let mut phase = 0.0f64;

    let mut frequency = config.min_frequency;
    while frequency < config.max_frequency {
        let mut group = Vec::with_capacity(capacity);
        let mut last_phi = 0.0f64;

        for _ in 0..capacity {
            let value = match method {
                SweepMethod::Naive => (2.0 * PI * frequency * t).sin(),
                SweepMethod::TimeAccumulator => {
                    last_phi = 2.0 * PI * frequency * t + phi_offset;
                    last_phi.sin()
                }
                SweepMethod::PhaseAccumulator => {
                    let value = phase.sin();
                    phase += 2.0 * PI * frequency * dt;
                    value
                }
            };
            group.push(value as f32);
            t += dt;
        }
        seq.push(group);

        let next_frequency = frequency * config.factor;
        if method == SweepMethod::TimeAccumulator {
            // continue from the phase of the last emitted sample
            phi_offset = last_phi + 2.0 * PI * next_frequency * dt - 2.0 * PI * next_frequency * t;
        }
        frequency = next_frequency;
    }

    log::debug!(
        "Generated {:?} sweep with {} groups ({}ms)",
        method,
        seq.group_count(),
        seq.duration().as_millis()
    );

    seq
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> Metadata {
        Metadata::new(48000, 1, 4096).unwrap()
    }

    /// Largest jump between neighboring samples
    fn max_step(seq: &SampleSequence<f32>) -> f32 {
        let samples: Vec<f32> = seq.iter().copied().collect();
        samples
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .fold(0.0, f32::max)
    }

    #[test]
    fn test_sine_whole_groups() {
        let seq = sine(metadata(), 440.0, Duration::from_millis(1000));
        // 48000 / 4096 = 11.7
        assert_eq!(seq.group_count(), 11);
        assert_eq!(seq.len(), 11 * 4096);
        assert!(seq.iter().all(|v| v.abs() <= 1.0));
    }

    #[test]
    fn test_sine_phase_is_continuous() {
        let seq = sine(metadata(), 440.0, Duration::from_millis(500));
        // 2π * 440 / 48000 per sample
        assert!(max_step(&seq) < 0.07);
    }

    #[test]
    fn test_sweep_group_count() {
        let seq = sweep(metadata(), SweepConfig::default(), SweepMethod::Naive);
        // 20 * 1.1^n < 20000 for n = 0..=72
        assert_eq!(seq.group_count(), 73);
    }

    #[test]
    fn test_continuous_sweeps_have_no_jumps() {
        let config = SweepConfig {
            min_frequency: 100.0,
            max_frequency: 1000.0,
            factor: 1.5,
        };
        // at most 2π * 1000 / 48000 per sample while phase is continuous
        let bound = 0.14;

        let phase = sweep(metadata(), config, SweepMethod::PhaseAccumulator);
        assert!(max_step(&phase) < bound);

        let time = sweep(metadata(), config, SweepMethod::TimeAccumulator);
        assert!(max_step(&time) < bound);

        let naive = sweep(metadata(), config, SweepMethod::Naive);
        assert!(max_step(&naive) > bound);
    }
}
