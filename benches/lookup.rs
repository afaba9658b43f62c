//! Lookup benchmarks
//!
//! Measures cached lookups against cold builds of a type hierarchy.

use classmeta::host::MemoryMethod;
use classmeta::{classify, ClassInfoCache, MemoryHost, TypeHandle};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

fn setup_hierarchy(depth: usize, members: usize) -> (Arc<MemoryHost>, Vec<TypeHandle>) {
    let host = Arc::new(MemoryHost::new());
    let mut handles = Vec::with_capacity(depth);
    let mut parent = None;

    for level in 0..depth {
        let ty = host.define_type(&format!("Type{level}"), parent).unwrap();
        for member in 0..members {
            host.add_field(ty, &format!("_f{member}"), (member * 8) as isize, "q");
            host.add_method(ty, MemoryMethod::new(format!("m{member}:"), "v", &["@", ":", "i"]));
            host.add_property(ty, &format!("p{member}"), "T@\"NSString\",C,N");
        }
        handles.push(ty);
        parent = Some(ty);
    }

    (host, handles)
}

fn bench_cached_lookup(c: &mut Criterion) {
    let (host, handles) = setup_hierarchy(16, 8);
    let leaf = *handles.last().unwrap();
    let cache = ClassInfoCache::new(host);
    cache.lookup(leaf);

    c.bench_function("lookup_hit", |b| b.iter(|| cache.lookup(black_box(leaf))));
    c.bench_function("lookup_by_name_hit", |b| b.iter(|| cache.lookup_by_name(black_box("Type15"))));
}

fn bench_cold_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_build");

    for depth in [1, 8, 32] {
        let (host, handles) = setup_hierarchy(depth, 8);
        let leaf = *handles.last().unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| {
                let cache = ClassInfoCache::new(host.clone());
                black_box(cache.lookup(leaf))
            })
        });
    }

    group.finish();
}

fn bench_prefetch(c: &mut Criterion) {
    let (host, handles) = setup_hierarchy(64, 4);

    c.bench_function("prefetch_64", |b| {
        b.iter(|| {
            let cache = ClassInfoCache::new(host.clone());
            black_box(cache.prefetch(&handles))
        })
    });
}

fn bench_classify(c: &mut Criterion) {
    let encodings = ["v", "rn^{CGPoint=dd}", "@\"NSString\"", "@?", "[16{CGRect={CGPoint=dd}{CGSize=dd}}]"];

    c.bench_function("classify", |b| {
        b.iter(|| {
            for encoding in &encodings {
                black_box(classify(black_box(encoding)));
            }
        })
    });
}

criterion_group!(benches, bench_cached_lookup, bench_cold_build, bench_prefetch, bench_classify);
criterion_main!(benches);
