//! Criterion benchmarks for pointclass-rf: forest training and prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use pointclass_rf::{FeatureView, RandomForestConfig, SplitFamily};

fn make_classification(
    n_samples: usize,
    n_features: usize,
    n_classes: usize,
    seed: u64,
) -> (Vec<f32>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut values = Vec::with_capacity(n_samples * n_features);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let class = i % n_classes;
        labels.push(class);
        for f in 0..n_features {
            let base = if f < 3 { class as f32 * 3.0 } else { 0.0 };
            values.push(base + rng.r#gen::<f32>() * 0.5);
        }
    }
    (values, labels)
}

fn bench_rf_train(c: &mut Criterion) {
    let (values, labels) = make_classification(500, 20, 5, 42);
    let features = FeatureView::new(&values, labels.len(), 20).unwrap();
    let cfg = RandomForestConfig::new().with_n_trees(50).with_seed(42);

    c.bench_function("rf_train_500x20_5class_50trees", |b| {
        b.iter(|| cfg.fit(&features, &labels).unwrap());
    });
}

fn bench_rf_train_linear(c: &mut Criterion) {
    let (values, labels) = make_classification(500, 20, 5, 42);
    let features = FeatureView::new(&values, labels.len(), 20).unwrap();
    let cfg = RandomForestConfig::new()
        .with_n_trees(50)
        .with_split_family(SplitFamily::Linear)
        .with_seed(42);

    c.bench_function("rf_train_linear_500x20_5class_50trees", |b| {
        b.iter(|| cfg.fit(&features, &labels).unwrap());
    });
}

fn bench_rf_predict_batch(c: &mut Criterion) {
    let (values, labels) = make_classification(500, 20, 5, 42);
    let features = FeatureView::new(&values, labels.len(), 20).unwrap();
    let cfg = RandomForestConfig::new().with_n_trees(50).with_seed(42);
    let forest = cfg.fit(&features, &labels).unwrap();

    c.bench_function("rf_predict_batch_500x20_50trees", |b| {
        b.iter(|| forest.predict_batch(&features).unwrap());
    });
}

fn bench_single_tree(c: &mut Criterion) {
    // Proxy for split-finding: train a single-tree forest on 500 samples.
    let (values, labels) = make_classification(500, 20, 5, 42);
    let features = FeatureView::new(&values, labels.len(), 20).unwrap();
    let cfg = RandomForestConfig::new().with_n_trees(1).with_seed(42);

    c.bench_function("rf_single_tree_500x20_5class", |b| {
        b.iter(|| cfg.fit(&features, &labels).unwrap());
    });
}

criterion_group!(
    benches,
    bench_rf_train,
    bench_rf_train_linear,
    bench_rf_predict_batch,
    bench_single_tree
);
criterion_main!(benches);
