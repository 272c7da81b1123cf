//! Performance benchmarks for smoothing and spectrum analysis

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sample_sequence::signal::sine;
use sample_sequence::{smooth, Metadata, SpectrumAnalyzer};
use std::time::Duration;

fn bench_smooth(c: &mut Criterion) {
    let samples: Vec<f32> = (0..48000)
        .map(|i| (i as f32 * 440.0 * 2.0 * std::f32::consts::PI / 48000.0).sin())
        .collect();

    c.bench_function("smooth_1s_radius_20", |b| {
        b.iter(|| smooth(black_box(&samples), black_box(20)));
    });
}

fn bench_analyze(c: &mut Criterion) {
    // 2 seconds of a 1 kHz tone at the default 48 kHz / 4096 samples per group
    let seq = sine(Metadata::default(), 1000.0, Duration::from_secs(2));
    let mut analyzer = SpectrumAnalyzer::default();

    c.bench_function("analyze_2s", |b| {
        b.iter(|| analyzer.analyze(black_box(&seq)));
    });
}

criterion_group!(benches, bench_smooth, bench_analyze);
criterion_main!(benches);
