use criterion::measurement::WallTime;
use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion,
};
use mvp_engine::{EngineConfig, Evaluator, Family, Point, Precision, Query};
use pprof::criterion::{Output, PProfProfiler};
use tabled::settings::{Settings, Style};
use tabled::{Table, Tabled};

/// Formulas are benchmarked for extra bits ranging from 0 to `DEFAULT_MAX_EXTRA_BITS` or
/// environment variable `D` (if defined).
const DEFAULT_MAX_EXTRA_BITS: u32 = 8;

const PRECISIONS: [Precision; 2] = [Precision::Double, Precision::DoubleDouble];

/// Families with the shape used for formula benchmarks and the drift table
const FORMULAS: [(Family, Option<f64>); 4] = [
    (Family::LOWER_BOUND, None),
    (Family::GRA, Some(0.75)),
    (Family::MARTINGALE, None),
    (Family::COMPRESSED_LOWER_BOUND, None),
];

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Protobuf));
    targets = benchmark
}
criterion_main!(benches);

fn benchmark(c: &mut Criterion) {
    let max_extra_bits = std::env::var("D")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_EXTRA_BITS);
    let extra_bits: Vec<u32> = (0..=max_extra_bits).step_by(2).collect();

    let mut group = c.benchmark_group("formula");
    for precision in PRECISIONS {
        let evaluator = evaluator(precision);
        for &d in &extra_bits {
            for (family, t) in FORMULAS {
                bench_formula(&mut group, &evaluator, family, d, t);
            }
        }
    }
    group.finish();

    let searches = [
        ("base", Family::LOWER_BOUND, Query::new().q(6.0).d(2)),
        ("shape", Family::GRA, Query::new().q(6.0).d(2).b(2.0)),
        ("joint", Family::GRA, Query::new().q(6.0).d(2)),
        ("extra_bits", Family::MARTINGALE, Query::new().q(6.0).b(2.0)),
    ];
    let mut group = c.benchmark_group("search");
    group.sample_size(10);
    for precision in PRECISIONS {
        let evaluator = evaluator(precision);
        for (name, family, query) in searches {
            bench_search(&mut group, &evaluator, name, family, query);
        }
    }
    group.finish();

    // the drift table is only written when a destination is given
    if let Ok(bench_results_path) = std::env::var("BENCH_RESULTS_PATH") {
        let drift = evaluator(Precision::DoubleDouble);
        let results: Vec<DriftRecord> = (0..=max_extra_bits)
            .map(|d| {
                let [lower_bound, gra, martingale, compressed_lower_bound] =
                    FORMULAS.map(|(family, t)| measure_drift(&drift, family, d, t));
                DriftRecord {
                    d,
                    lower_bound,
                    gra,
                    martingale,
                    compressed_lower_bound,
                }
            })
            .collect();

        let table_config = Settings::default().with(Style::markdown());
        std::fs::write(
            format!("{}/precision_drift.md", bench_results_path),
            Table::new(results).with(table_config).to_string(),
        )
        .unwrap();
    }
}

fn evaluator(precision: Precision) -> Evaluator {
    Evaluator::new(EngineConfig::default().with_precision(precision)).unwrap()
}

fn point(d: u32, t: Option<f64>) -> Point {
    Point::new(Some(6.0), d, 2.0, t)
}

fn bench_formula(
    group: &mut BenchmarkGroup<WallTime>,
    evaluator: &Evaluator,
    family: Family,
    d: u32,
    t: Option<f64>,
) {
    let id = format!("{}/{:?}", family, evaluator.config().precision);
    group.bench_with_input(BenchmarkId::new(id, d), &point(d, t), |b, point| {
        b.iter(|| evaluator.mvp(family, black_box(point)).unwrap());
    });
}

fn bench_search(
    group: &mut BenchmarkGroup<WallTime>,
    evaluator: &Evaluator,
    name: &str,
    family: Family,
    query: Query,
) {
    let id = format!("{}/{}", name, family);
    let precision = format!("{:?}", evaluator.config().precision);
    group.bench_with_input(BenchmarkId::new(id, precision), &query, |b, query| {
        b.iter(|| evaluator.evaluate(family, black_box(query)).unwrap());
    });
}

fn measure_drift(evaluator: &Evaluator, family: Family, d: u32, t: Option<f64>) -> String {
    match evaluator.precision_drift(family, &point(d, t)) {
        Ok(drift) => format!("{:.2e}", drift),
        Err(err) => err.to_string(),
    }
}

#[derive(Tabled)]
struct DriftRecord {
    d: u32,
    lower_bound: String,
    gra: String,
    martingale: String,
    compressed_lower_bound: String,
}
