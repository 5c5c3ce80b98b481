//! Benchmarks for indicator implementations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use techchart_core::traits::{Indicator, OhlcvIndicator};
use techchart_core::types::{Bar, BaseSeries};
use techchart_indicators::{window, BollingerBands, Ema, ParabolicSar, Rci, Rsi, Sma};

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn generate_test_data(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0)
        .collect()
}

fn generate_series(size: usize) -> BaseSeries {
    let bars = generate_test_data(size)
        .into_iter()
        .enumerate()
        .map(|(i, close)| Bar::new(i as i64 * 60_000, close, close + 0.5, close - 0.5, close, 1_000.0))
        .collect();
    BaseSeries::new("BENCH", bars).expect("generated bars are valid")
}

fn benchmark_moving_averages(c: &mut Criterion) {
    let mut group = c.benchmark_group("MovingAverage");

    for size in SIZES.iter() {
        let data = generate_test_data(*size);

        group.bench_with_input(BenchmarkId::new("sma", size), &data, |b, data| {
            let sma = Sma::new(20).unwrap();
            b.iter(|| sma.calculate(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("ema", size), &data, |b, data| {
            let ema = Ema::new(20).unwrap();
            b.iter(|| ema.calculate(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("rolling_std", size), &data, |b, data| {
            b.iter(|| window::rolling_std(black_box(data), black_box(20)))
        });
    }

    group.finish();
}

fn benchmark_oscillators(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oscillator");

    for size in SIZES.iter() {
        let data = generate_test_data(*size);

        group.bench_with_input(BenchmarkId::new("rsi", size), &data, |b, data| {
            let rsi = Rsi::new(14).unwrap();
            b.iter(|| rsi.calculate(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("rci", size), &data, |b, data| {
            let rci = Rci::new(9).unwrap();
            b.iter(|| rci.calculate(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("bollinger", size), &data, |b, data| {
            let bb = BollingerBands::new();
            b.iter(|| bb.calculate(black_box(data)))
        });
    }

    group.finish();
}

fn benchmark_parabolic_sar(c: &mut Criterion) {
    let mut group = c.benchmark_group("ParabolicSAR");

    for size in SIZES.iter() {
        let series = generate_series(*size);

        group.bench_with_input(BenchmarkId::new("run", size), &series, |b, series| {
            let psar = ParabolicSar::new();
            b.iter(|| psar.calculate(black_box(series)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_moving_averages,
    benchmark_oscillators,
    benchmark_parabolic_sar
);
criterion_main!(benches);
