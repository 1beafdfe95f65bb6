//! Criterion benchmarks for the deprn predictor.
//!
//! - Text analysis of asset descriptions
//! - Training on the bundled dataset
//! - Single and batch prediction

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use deprn::analysis::analyzer::DescriptionAnalyzer;
use deprn::config::{ModelKind, PredictorConfig};
use deprn::depreciation::{Dataset, DeprnPredictor};

/// Generate asset descriptions for benchmarking.
fn generate_descriptions(count: usize) -> Vec<String> {
    let words = [
        "company", "car", "laptop", "desk", "chairs", "forklift", "warehouse", "printer",
        "software", "licence", "phone", "leased", "office", "fitout", "server", "van",
        "monitor", "shelving", "compressor", "building",
    ];

    (0..count)
        .map(|i| {
            let length = 3 + (i % 6);
            (0..length)
                .map(|j| words[(i * 7 + j * 13) % words.len()]) // Pseudo-random distribution
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Benchmark description analysis.
fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");

    let analyzer = DescriptionAnalyzer::new().unwrap();
    let descriptions = generate_descriptions(100);

    group.throughput(Throughput::Elements(100));
    group.bench_function("analyze_descriptions", |b| {
        b.iter(|| {
            for description in &descriptions {
                let _ = black_box(analyzer.terms(black_box(description)));
            }
        })
    });

    group.finish();
}

/// Benchmark training on the bundled dataset.
fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(20);

    let dataset = Dataset::bundled().unwrap();
    for kind in [ModelKind::NaiveBayes, ModelKind::Prototype] {
        let mut config = PredictorConfig::default();
        config.model.kind = kind;
        group.bench_function(kind.as_str(), |b| {
            b.iter(|| black_box(DeprnPredictor::train(&config, &dataset).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark prediction with both classifiers.
fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    let dataset = Dataset::bundled().unwrap();
    let descriptions = generate_descriptions(1000);

    for kind in [ModelKind::NaiveBayes, ModelKind::Prototype] {
        let mut config = PredictorConfig::default();
        config.model.kind = kind;
        let predictor = DeprnPredictor::train(&config, &dataset).unwrap();

        group.throughput(Throughput::Elements(1));
        group.bench_function(format!("{}_single", kind.as_str()), |b| {
            b.iter(|| black_box(predictor.predict(black_box("company car used for sales visits"))))
        });

        group.throughput(Throughput::Elements(descriptions.len() as u64));
        group.bench_function(format!("{}_batch", kind.as_str()), |b| {
            b.iter(|| black_box(predictor.predict_batch(black_box(descriptions.as_slice()))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analysis, bench_training, bench_prediction);

criterion_main!(benches);
