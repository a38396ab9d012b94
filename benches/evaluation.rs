use criterion::{black_box, criterion_group, criterion_main, Criterion};
use evalexpr::*;
use scalc_rs::batch::calc_batch;
use scalc_rs::engine::calculate;
use scalc_rs::{BigDecimal, CalculationOptions, CalculatorBuilder, ParameterBag};

fn bag(entries: &[(&str, i64)]) -> ParameterBag {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), Some(BigDecimal::from(*value))))
        .collect()
}

/// Benchmark simple arithmetic expressions
fn benchmark_simple_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("Simple arithmetic Expression Evaluation");

    let expr = "2 + 3 * 4";
    let options = CalculationOptions::new(expr);
    let empty = ParameterBag::new();
    let precompiled_evalexpr = build_operator_tree::<DefaultNumericTypes>(expr).unwrap();

    group.bench_function("decimal_arithmetic", |b| {
        b.iter(|| calculate(black_box(&options), black_box(&empty)).unwrap())
    });

    group.bench_function("native_rust_arithmetic", |b| {
        b.iter(|| black_box(2.0 + 3.0 * 4.0))
    });

    group.bench_function("meval_arithmetic", |b| {
        b.iter(|| meval::eval_str(black_box(expr)).unwrap())
    });

    group.bench_function("evalexpr_arithmetic", |b| {
        b.iter(|| evalexpr::eval(black_box(expr)).unwrap())
    });

    group.bench_function("precompiled_evalexpr_arithmetic", |b| {
        b.iter(|| precompiled_evalexpr.eval().unwrap())
    });
}

/// Benchmark complex arithmetic expressions
fn benchmark_complex_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("Complex arithmetic Expression Evaluation");

    let expr = "(10 + 20) * 3 / (4 - 1) + 5";
    let options = CalculationOptions::new(expr);
    let empty = ParameterBag::new();

    group.bench_function("decimal_complex_arithmetic", |b| {
        b.iter(|| calculate(black_box(&options), black_box(&empty)).unwrap())
    });

    group.bench_function("native_rust_complex_arithmetic", |b| {
        b.iter(|| black_box((10.0 + 20.0) * 3.0 / (4.0 - 1.0) + 5.0))
    });

    group.bench_function("meval_complex_arithmetic", |b| {
        b.iter(|| meval::eval_str(black_box(expr)).unwrap())
    });

    group.bench_function("evalexpr_complex_arithmetic", |b| {
        b.iter(|| evalexpr::eval(black_box(expr)).unwrap())
    });
}

/// Benchmark parameter substitution
fn benchmark_parameters(c: &mut Criterion) {
    let mut group = c.benchmark_group("Parameter Evaluation");

    let options = CalculationOptions::new("a + b * √(16)");
    let params = bag(&[("a", 10), ("b", 2)]);

    group.bench_function("decimal_parameters", |b| {
        b.iter(|| calculate(black_box(&options), black_box(&params)).unwrap())
    });

    let mut calculator = CalculatorBuilder::<f64>::new()
        .expression("a + b * √(16)")
        .build();
    group.bench_function("calculator_parameters", |b| {
        b.iter(|| {
            calculator.parameter("a", 10).unwrap().parameter("b", 2).unwrap();
            black_box(calculator.calc().unwrap())
        })
    });

    let meval_expr: meval::Expr = "a + b * sqrt(16)".parse().unwrap();
    let bound = meval_expr.bind2("a", "b").unwrap();
    group.bench_function("meval_parameters", |b| {
        b.iter(|| black_box(bound(black_box(10.0), black_box(2.0))))
    });
}

/// Benchmark definition blocks
fn benchmark_definitions(c: &mut Criterion) {
    let mut group = c.benchmark_group("Definition Block Evaluation");

    let options = CalculationOptions::new(
        "f(x,y)=10+(x*y)-1; g(x)=sqrt(x); variable1=7; return f(2,3)+g(4)-variable1;",
    );
    let empty = ParameterBag::new();

    group.bench_function("definition_block", |b| {
        b.iter(|| calculate(black_box(&options), black_box(&empty)).unwrap())
    });
}

/// Benchmark many parameter bags at once
fn benchmark_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Batch Evaluation");

    let options = CalculationOptions::new("price * volume / 100");
    let bags: Vec<ParameterBag> = (1..=1000)
        .map(|i| bag(&[("price", i), ("volume", 1000 - i)]))
        .collect();

    group.bench_function("sequential_batch", |b| {
        b.iter(|| {
            bags.iter()
                .map(|params| calculate(&options, params))
                .collect::<Vec<_>>()
        })
    });

    group.bench_function("parallel_batch", |b| {
        b.iter(|| calc_batch(black_box(&options), black_box(&bags)))
    });
}

/// Grouping benchmarks
criterion_group!(
    benches,
    benchmark_simple_arithmetic,
    benchmark_complex_arithmetic,
    benchmark_parameters,
    benchmark_definitions,
    benchmark_batch,
);
criterion_main!(benches);
