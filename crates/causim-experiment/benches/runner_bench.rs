use criterion::{criterion_group, criterion_main, Criterion};

use causim_causal::{analyze, to_gml, GmlExportOptions};
use causim_experiment::presets::predator_prey;
use causim_experiment::{run, run_parallel, RunOptions};

fn options(num_samples: usize) -> RunOptions {
    RunOptions::default().with_samples(num_samples).with_seed(1)
}

fn bench_sequential_1k_samples(c: &mut Criterion) {
    let experiment = predator_prey(3, 6).unwrap();
    let opts = options(1000);

    c.bench_function("run_sequential_1k_samples", |b| {
        b.iter(|| run(&experiment, &opts).unwrap());
    });
}

fn bench_parallel_1k_samples(c: &mut Criterion) {
    let experiment = predator_prey(3, 6).unwrap();
    let opts = RunOptions {
        parallel: true,
        ..options(1000)
    };

    c.bench_function("run_parallel_1k_samples", |b| {
        b.iter(|| run_parallel(&experiment, &opts).unwrap());
    });
}

/// Cost of tracing: one sample with and without the graph.
fn bench_traced_sample(c: &mut Criterion) {
    let experiment = predator_prey(10, 30).unwrap();
    let traced = options(1);
    let untraced = RunOptions {
        causal_graph: false,
        ..options(1)
    };

    c.bench_function("single_sample_traced_30_steps", |b| {
        b.iter(|| run(&experiment, &traced).unwrap());
    });
    c.bench_function("single_sample_untraced_30_steps", |b| {
        b.iter(|| run(&experiment, &untraced).unwrap());
    });
}

fn bench_graph_export_and_screening(c: &mut Criterion) {
    let dataset = run(&predator_prey(10, 30).unwrap(), &options(1)).unwrap();
    let graph = dataset.causal_graph.unwrap();
    let opts = GmlExportOptions::default();

    c.bench_function("gml_export_30_steps", |b| {
        b.iter(|| to_gml(&graph, &opts).unwrap());
    });
    c.bench_function("backdoor_screening_30_steps", |b| {
        b.iter(|| analyze(&graph));
    });
}

criterion_group!(
    benches,
    bench_sequential_1k_samples,
    bench_parallel_1k_samples,
    bench_traced_sample,
    bench_graph_export_and_screening,
);
criterion_main!(benches);
