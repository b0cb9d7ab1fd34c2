//! Criterion benchmarks for reverblab-analysis
//!
//! Run with: cargo bench -p reverblab-analysis

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use reverblab_analysis::{ImpulseResponse, SpectrumAnalyzer, Window, spectral_centroid};
use reverblab_core::{ReverbConfig, Reverberator};

const SAMPLE_RATE: f32 = 48000.0;

fn render(secs: f32) -> ImpulseResponse {
    let mut reverb: Reverberator = Reverberator::new(ReverbConfig {
        rt60: secs / 2.0,
        ..ReverbConfig::default()
    });
    reverb
        .configure(SAMPLE_RATE, 512)
        .expect("valid sample rate");
    ImpulseResponse::render(&mut reverb, (secs * SAMPLE_RATE) as usize).expect("configured")
}

fn bench_decay(c: &mut Criterion) {
    let mut group = c.benchmark_group("Decay");
    for secs in [1.0f32, 4.0] {
        let ir = render(secs);
        group.bench_with_input(BenchmarkId::new("estimate_rt60", secs), &ir, |b, ir| {
            b.iter(|| black_box(ir.estimate_rt60()));
        });
    }
    group.bench_function("render_1s", |b| b.iter(|| black_box(render(1.0))));
    group.finish();
}

fn bench_spectrum(c: &mut Criterion) {
    let ir = render(1.0);
    let channel = ir.channel(0).expect("rendered channel").to_vec();
    let mut group = c.benchmark_group("Spectrum");
    for size in [1024usize, 4096] {
        let mut analyzer = SpectrumAnalyzer::new(size, Window::Hann);
        group.bench_with_input(BenchmarkId::new("centroid", size), &channel, |b, signal| {
            b.iter(|| {
                let spectrum = analyzer.magnitude(black_box(signal));
                black_box(spectral_centroid(&spectrum, SAMPLE_RATE))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decay, bench_spectrum);
criterion_main!(benches);
