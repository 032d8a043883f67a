use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use modelq::{Entity, ModelQuery, ModelRegistry, WhereExpr, qb};

struct Widget;

impl Entity for Widget {
    fn entity_name() -> &'static str {
        "Widget"
    }
}

/// Builder with `n` projected columns and `n` equality filters, each in its
/// own `where_` call.
fn build_query(registry: &ModelRegistry, n: usize) -> ModelQuery<'_> {
    let mut q = qb::model::<Widget>(registry);
    for i in 0..n {
        q = q
            .column(&format!("col{i}"))
            .where_(WhereExpr::new().eq(&format!("col{i}"), i as i64));
    }
    q.paginate(3, 25)
}

fn bench_compile_find(c: &mut Criterion) {
    let registry = ModelRegistry::new();
    let mut group = c.benchmark_group("compile/find");

    for n in [1, 5, 10, 50, 100] {
        let q = build_query(&registry, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.to_find_descriptor()));
        });
    }

    group.finish();
}

fn bench_build_and_compile(c: &mut Criterion) {
    let registry = ModelRegistry::new();
    let mut group = c.benchmark_group("compile/build_and_compile");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let q = build_query(&registry, n);
                black_box(q.to_find_all_descriptor());
            });
        });
    }

    group.finish();
}

fn bench_render_json(c: &mut Criterion) {
    let registry = ModelRegistry::new();
    let mut group = c.benchmark_group("compile/render_json");

    for n in [5, 50] {
        let descriptor = build_query(&registry, n).to_find_descriptor();
        group.bench_with_input(BenchmarkId::from_parameter(n), &descriptor, |b, d| {
            b.iter(|| black_box(d.to_string()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compile_find,
    bench_build_and_compile,
    bench_render_json
);
criterion_main!(benches);
