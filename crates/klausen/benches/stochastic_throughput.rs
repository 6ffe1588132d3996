use criterion::{criterion_group, criterion_main, Criterion};

use klausen::{Engine, KlausenError, NamedValues, ParameterValue, RawSpec};

fn sample_engine() -> Engine {
    Engine::declare([
        ("fuel", RawSpec::uniform(90.0, 110.0)),
        ("efficiency", RawSpec::triangular(0.4, 0.5, 0.6)),
        ("factor", RawSpec::lognormal(0.0, 0.2)),
        ("loss", RawSpec::normal(0.01, 0.003).minimum(0.005)),
        ("blend", RawSpec::empirical(vec![0.1, 0.2, 0.25, 0.4])),
    ])
    .unwrap()
}

fn emissions(p: &dyn NamedValues) -> Result<ParameterValue, KlausenError> {
    Ok(&p["fuel"] / &p["efficiency"] * &p["factor"] * (1.0 + &p["loss"]) * &p["blend"])
}

fn bench_stochastic(c: &mut Criterion) {
    let mut engine = sample_engine();
    c.bench_function("stochastic_1000", |b| {
        b.iter(|| {
            engine.stochastic(1000, Some(42)).unwrap();
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let mut engine = sample_engine();
    engine.stochastic(1000, Some(42)).unwrap();
    c.bench_function("evaluate_1000", |b| {
        b.iter(|| {
            let _ = engine.evaluate(&emissions).unwrap();
        })
    });
}

criterion_group!(benches, bench_stochastic, bench_evaluate);
criterion_main!(benches);
