use classmeta::{ClassInfoCache, MemoryHost, TypeHandle};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 16;

fn deep_host(depth: usize) -> (Arc<MemoryHost>, Vec<TypeHandle>) {
    let host = Arc::new(MemoryHost::new());
    let mut handles = Vec::with_capacity(depth);
    let mut parent = None;
    for level in 0..depth {
        let ty = host.define_type(&format!("Level{level}"), parent).unwrap();
        host.add_property(ty, &format!("p{level}"), "Ti,N");
        handles.push(ty);
        parent = Some(ty);
    }
    (host, handles)
}

#[test]
fn test_concurrent_lookups_build_once() {
    let (host, handles) = deep_host(8);
    let leaf = *handles.last().unwrap();
    let cache = Arc::new(ClassInfoCache::new(host));
    let barrier = Arc::new(Barrier::new(THREADS));

    let results: Vec<_> = (0..THREADS)
        .map(|_| {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                cache.lookup(leaf).unwrap()
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    for info in &results[1..] {
        assert!(Arc::ptr_eq(&results[0], info));
    }
    assert_eq!(cache.stats().builds, 8, "one build per type in the chain");
    assert_eq!(cache.len(), 8);
}

#[test]
fn test_concurrent_lookups_across_types() {
    let (host, handles) = deep_host(32);
    let cache = Arc::new(ClassInfoCache::new(host));

    thread::scope(|scope| {
        for chunk in handles.chunks(4) {
            let cache = &cache;
            scope.spawn(move || {
                for handle in chunk.iter().rev() {
                    assert!(cache.lookup(*handle).is_some());
                }
            });
        }
    });

    assert_eq!(cache.stats().builds, 32);
    let leaf = cache.lookup(*handles.last().unwrap()).unwrap();
    assert_eq!(leaf.ancestors().count(), 32);
}

#[test]
fn test_invalidate_while_reading() {
    let (host, handles) = deep_host(4);
    let leaf = handles[3];
    let cache = Arc::new(ClassInfoCache::new(host));
    let first = cache.lookup(leaf).unwrap();

    thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..100 {
                cache.invalidate_type(leaf);
            }
        });
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..100 {
                    let info = cache.lookup(leaf).unwrap();
                    assert_eq!(info.name(), "Level3");
                }
            });
        }
    });

    assert!(first.needs_update());
    let latest = cache.lookup(leaf).unwrap();
    assert!(!latest.needs_update());
    assert!(Arc::ptr_eq(&cache.cached_by_name("Level3").unwrap(), &latest));
}

#[test]
fn test_prefetch_warms_every_type() {
    let (host, handles) = deep_host(24);
    let cache = ClassInfoCache::new(host);

    assert_eq!(cache.prefetch(&handles), 24);
    assert_eq!(cache.len(), 24);

    let before = cache.stats().builds;
    for handle in &handles {
        cache.lookup(*handle).unwrap();
    }
    assert_eq!(cache.stats().builds, before);
}
