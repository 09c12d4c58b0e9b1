use std::hash::BuildHasherDefault;

use criterion::measurement::WallTime;
use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion, Throughput,
};
use hll_accuracy::stats::relative_error;
use hll_accuracy::{DistinctCounter, ExactCounter, HashFamily, HyperLogLog, RandomStream, Token};
use hyperloglogplus::HyperLogLog as HyperLogLogTrait;
use pprof::criterion::{Output, PProfProfiler};
use tabled::settings::{Settings, Style};
use tabled::{Table, Tabled};
use wyhash::WyHash;

/// Update and estimate operations are benchmarked against stream sizes ranging from 1 to
/// `DEFAULT_MAX_CARDINALITY` or environment variable `N` (if defined), doubled with every
/// iteration as [1, 2, 4, ..., N].
const DEFAULT_MAX_CARDINALITY: usize = 65536;

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Protobuf));
    targets = benchmark
}
criterion_main!(benches);

fn benchmark(c: &mut Criterion) {
    let bench_results_path =
        std::env::var("BENCH_RESULTS_PATH").unwrap_or_else(|_| "target".to_string());
    let max_cardinality = std::env::var("N")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_CARDINALITY);

    let cardinalities: Vec<usize> = (0..)
        .map(|c| 1 << c)
        .take_while(|&c| c <= max_cardinality)
        .collect();

    let mut group = c.benchmark_group("update");
    for &cardinality in &cardinalities {
        let tokens = RandomStream::with_seed(cardinality, 12345).next_portion(1.0);
        group.throughput(Throughput::Elements(cardinality as u64));
        bench_update::<Exact>(&mut group, &tokens);
        bench_update::<Sketch<6>>(&mut group, &tokens);
        bench_update::<Sketch<10>>(&mut group, &tokens);
        bench_update::<Sketch<14>>(&mut group, &tokens);
        bench_update::<AmadeusStreamingEstimator>(&mut group, &tokens);
        bench_update::<ProbabilisticCollections>(&mut group, &tokens);
        bench_update::<HyperLogLogCrate>(&mut group, &tokens);
        bench_update::<HyperLogLogPlus>(&mut group, &tokens);
    }
    group.finish();

    let mut group = c.benchmark_group("estimate");
    group.throughput(Throughput::Elements(1));
    for &cardinality in &cardinalities {
        let tokens = RandomStream::with_seed(cardinality, 12345).next_portion(1.0);
        bench_estimate::<Exact>(&mut group, &tokens);
        bench_estimate::<Sketch<6>>(&mut group, &tokens);
        bench_estimate::<Sketch<10>>(&mut group, &tokens);
        bench_estimate::<Sketch<14>>(&mut group, &tokens);
        bench_estimate::<AmadeusStreamingEstimator>(&mut group, &tokens);
        bench_estimate::<ProbabilisticCollections>(&mut group, &tokens);
        bench_estimate::<HyperLogLogCrate>(&mut group, &tokens);
        bench_estimate::<HyperLogLogPlus>(&mut group, &tokens);
    }
    group.finish();

    let results: Vec<StatRecord> = cardinalities
        .iter()
        .map(|&cardinality| StatRecord {
            cardinality,
            hll_accuracy_p6: measure_error::<Sketch<6>>(cardinality),
            hll_accuracy_p10: measure_error::<Sketch<10>>(cardinality),
            hll_accuracy_p14: measure_error::<Sketch<14>>(cardinality),
            amadeus_streaming: measure_error::<AmadeusStreamingEstimator>(cardinality),
            probabilistic_collections: measure_error::<ProbabilisticCollections>(cardinality),
            hyperloglog: measure_error::<HyperLogLogCrate>(cardinality),
            hyperloglogplus: measure_error::<HyperLogLogPlus>(cardinality),
        })
        .collect();

    let table_config = Settings::default().with(Style::markdown());
    std::fs::write(
        format!("{}/relative_error.md", bench_results_path),
        Table::new(results).with(table_config).to_string(),
    )
    .unwrap();
}

/// Common counter operations for the crate's own counters and third-party estimators.
trait Estimator {
    fn new() -> Self;
    fn update(&mut self, tokens: &[Token]);
    fn estimate(&mut self) -> f64;
    fn name() -> String;
}

fn bench_update<E: Estimator>(group: &mut BenchmarkGroup<WallTime>, tokens: &[Token]) {
    group.bench_with_input(
        BenchmarkId::new(E::name(), tokens.len()),
        tokens,
        |b, tokens| {
            b.iter(|| {
                let mut estimator = E::new();
                estimator.update(black_box(tokens));
            });
        },
    );
}

fn bench_estimate<E: Estimator>(group: &mut BenchmarkGroup<WallTime>, tokens: &[Token]) {
    group.bench_with_input(
        BenchmarkId::new(E::name(), tokens.len()),
        tokens,
        |b, tokens| {
            let mut estimator = E::new();
            estimator.update(tokens);
            b.iter(|| estimator.estimate());
        },
    );
}

/// Average relative error against exact distinct count over 100 seeded streams
fn measure_error<E: Estimator>(cardinality: usize) -> String {
    let n = 100;
    let mut total_relative_error: f64 = 0.0;
    for seed in 0..n {
        let tokens = RandomStream::with_seed(cardinality, seed).next_portion(1.0);
        let mut exact = ExactCounter::new();
        exact.add(&tokens);
        let mut estimator = E::new();
        estimator.update(&tokens);
        total_relative_error += relative_error(estimator.estimate(), exact.size() as f64);
    }
    let avg_relative_error = total_relative_error / (n as f64);

    if avg_relative_error < 1.0 {
        format!("{:.4}", avg_relative_error)
    } else {
        format!("{:.2e}", avg_relative_error)
    }
}

#[derive(Tabled)]
struct StatRecord {
    cardinality: usize,
    hll_accuracy_p6: String,
    hll_accuracy_p10: String,
    hll_accuracy_p14: String,
    amadeus_streaming: String,
    probabilistic_collections: String,
    hyperloglog: String,
    hyperloglogplus: String,
}

struct Exact(ExactCounter);

impl Estimator for Exact {
    fn new() -> Self {
        Self(ExactCounter::new())
    }

    fn update(&mut self, tokens: &[Token]) {
        self.0.add_batch(tokens);
    }

    fn estimate(&mut self) -> f64 {
        self.0.count()
    }

    fn name() -> String {
        "exact".to_string()
    }
}

struct Sketch<const P: u8>(HyperLogLog);

impl<const P: u8> Estimator for Sketch<P> {
    fn new() -> Self {
        Self(HyperLogLog::new(P, HashFamily::new().generate()).unwrap())
    }

    fn update(&mut self, tokens: &[Token]) {
        self.0.add_batch(tokens);
    }

    fn estimate(&mut self) -> f64 {
        self.0.count()
    }

    fn name() -> String {
        format!("hll-accuracy-p{}", P)
    }
}

struct AmadeusStreamingEstimator(amadeus_streaming::HyperLogLog<Token>);

impl Estimator for AmadeusStreamingEstimator {
    fn new() -> Self {
        AmadeusStreamingEstimator(amadeus_streaming::HyperLogLog::new(0.01625))
    }

    fn update(&mut self, tokens: &[Token]) {
        for token in tokens {
            self.0.push(token);
        }
    }

    fn estimate(&mut self) -> f64 {
        self.0.len()
    }

    fn name() -> String {
        "amadeus-streaming".to_string()
    }
}

struct ProbabilisticCollections(probabilistic_collections::hyperloglog::HyperLogLog<Token>);

impl Estimator for ProbabilisticCollections {
    fn new() -> Self {
        Self(probabilistic_collections::hyperloglog::HyperLogLog::new(
            0.004,
        ))
    }

    fn update(&mut self, tokens: &[Token]) {
        for token in tokens {
            self.0.insert(token);
        }
    }

    fn estimate(&mut self) -> f64 {
        self.0.len()
    }

    fn name() -> String {
        "probabilistic-collections".to_string()
    }
}

struct HyperLogLogCrate(hyperloglog::HyperLogLog);

impl Estimator for HyperLogLogCrate {
    fn new() -> Self {
        Self(hyperloglog::HyperLogLog::new(0.004))
    }

    fn update(&mut self, tokens: &[Token]) {
        for token in tokens {
            self.0.insert(token);
        }
    }

    fn estimate(&mut self) -> f64 {
        self.0.len()
    }

    fn name() -> String {
        "hyperloglog".to_string()
    }
}

struct HyperLogLogPlus(hyperloglogplus::HyperLogLogPlus<Token, BuildHasherDefault<WyHash>>);

impl Estimator for HyperLogLogPlus {
    fn new() -> Self {
        Self(
            hyperloglogplus::HyperLogLogPlus::new(12, BuildHasherDefault::<WyHash>::default())
                .unwrap(),
        )
    }

    fn update(&mut self, tokens: &[Token]) {
        for token in tokens {
            self.0.insert(token);
        }
    }

    fn estimate(&mut self) -> f64 {
        self.0.count()
    }

    fn name() -> String {
        "hyperloglogplus".to_string()
    }
}
