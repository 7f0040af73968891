//! Criterion benchmarks for unit resolution performance

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mensura_units::{UnitResolver, UnitSystem, UnitsConfig};
use std::time::Duration;

fn custom_criterion() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .warm_up_time(Duration::from_millis(200))
        .measurement_time(Duration::from_secs(2))
}

fn bench_uncached_resolution(c: &mut Criterion) {
    let resolver = UnitResolver::new(&UnitsConfig::default_units()).unwrap();

    c.bench_function("resolve_name", |b| {
        b.iter(|| resolver.resolve(black_box("N")).unwrap())
    });

    c.bench_function("resolve_composite", |b| {
        b.iter(|| resolver.resolve(black_box("kg*m/s^2")).unwrap())
    });

    c.bench_function("resolve_fractional_power", |b| {
        b.iter(|| resolver.resolve(black_box("1.25 * m^(4/3)")).unwrap())
    });
}

fn bench_cached_lookup(c: &mut Criterion) {
    let system = UnitSystem::new(&UnitsConfig::default_units()).unwrap();
    system.unit("kg*m/s^2").unwrap();

    c.bench_function("cached_unit_lookup", |b| {
        b.iter(|| system.unit(black_box("kg*m/s^2")).unwrap())
    });
}

fn bench_conversion(c: &mut Criterion) {
    let system = UnitSystem::new(&UnitsConfig::default_units()).unwrap();
    let from = system.unit("degF").unwrap();
    let to = system.unit("degC").unwrap();

    c.bench_function("conversion_to", |b| {
        b.iter(|| from.conversion_to(black_box(Some(&to))).unwrap())
    });
}

criterion_group! {
    name = benches;
    config = custom_criterion();
    targets = bench_uncached_resolution, bench_cached_lookup, bench_conversion
}
criterion_main!(benches);
