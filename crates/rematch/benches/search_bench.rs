use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rematch::Pattern;
use std::hint::black_box;

fn bench_facade_search(c: &mut Criterion) {
    let pattern = Pattern::new(r"(\w+)@([\w.]+)");
    let text = "client 10.1.4.7 wrote to billing@example.net after the retry window";

    let mut group = c.benchmark_group("facade_search");
    group.throughput(Throughput::Elements(1));

    group.bench_function("find_index", |b| {
        b.iter(|| black_box(pattern.find_index(black_box(text), 0).unwrap()));
    });

    group.bench_function("search_then_accessors", |b| {
        b.iter(|| {
            pattern.search(black_box(text), 0).unwrap();
            black_box((
                pattern.match_position(0).unwrap(),
                pattern.match_length(0).unwrap(),
            ));
        });
    });

    group.bench_function("search_captures", |b| {
        b.iter(|| black_box(pattern.search_captures(black_box(text), 0).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_facade_search);
criterion_main!(benches);
