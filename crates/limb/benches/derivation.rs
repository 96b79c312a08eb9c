//! Criterion benchmarks for deriving and evaluating the leg equations.

use criterion::{Criterion, criterion_group, criterion_main};
use limb::{LegModel, LegParameters};

fn bench_derive(c: &mut Criterion) {
    let model = LegModel::new().unwrap();
    c.bench_function("derive_leg_equations", |b| {
        b.iter(|| model.derive().unwrap());
    });
}

fn bench_rhs(c: &mut Criterion) {
    let ode = LegModel::new().unwrap().derive().unwrap().ode_function().unwrap();
    let p = LegParameters::default().values();
    let x = [0.1, -0.3, 0.2, 0.5, -1.0, 0.7];
    let r = [1.0, -2.0, 0.5];

    let mut group = c.benchmark_group("leg_numeric");
    group.bench_function("mass_matrix", |b| b.iter(|| ode.mass_matrix(&x, &r, &p)));
    group.bench_function("forcing", |b| b.iter(|| ode.forcing(&x, &r, &p)));
    group.bench_function("rhs", |b| b.iter(|| ode.rhs(&x, &r, &p).unwrap()));
    group.finish();
}

criterion_group!(benches, bench_derive, bench_rhs);
criterion_main!(benches);
