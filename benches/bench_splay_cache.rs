use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;
use splay_collections::splay_cache::SplayCache;
use std::collections::{BTreeMap, HashMap};

const NUM_OF_OPERATIONS: usize = 1000;
const NUM_OF_HOT_KEYS: usize = 16;
const FIBONACCI_INDEX: u64 = 90;

fn fibonacci_splay(n: u64, cache: &mut SplayCache<u64, u64>) -> u64 {
    if let Some(&value) = cache.find(&n) {
        return value;
    }
    let value = if n < 2 {
        n
    } else {
        fibonacci_splay(n - 1, cache) + fibonacci_splay(n - 2, cache)
    };
    cache.insert(n, value);
    value
}

fn fibonacci_hash(n: u64, cache: &mut HashMap<u64, u64>) -> u64 {
    if let Some(&value) = cache.get(&n) {
        return value;
    }
    let value = if n < 2 {
        n
    } else {
        fibonacci_hash(n - 1, cache) + fibonacci_hash(n - 2, cache)
    };
    cache.insert(n, value);
    value
}

fn bench_splay_cache_insert(c: &mut Criterion) {
    c.bench_function("bench splay_cache insert", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut cache = SplayCache::new();
            for _ in 0..NUM_OF_OPERATIONS {
                let key = rng.next_u32();
                let val = rng.next_u32();

                cache.insert(key, val);
            }
        })
    });
}

fn bench_splay_cache_find_hot(c: &mut Criterion) {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    let mut cache = SplayCache::new();
    let mut keys = Vec::new();
    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.next_u32();
        if cache.insert(key, key) {
            keys.push(key);
        }
    }
    let hot_keys = keys[..NUM_OF_HOT_KEYS].to_vec();

    c.bench_function("bench splay_cache find hot", move |b| {
        b.iter(|| {
            for key in &hot_keys {
                black_box(cache.find(key));
            }
        })
    });
}

fn bench_btreemap_get_hot(c: &mut Criterion) {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    let mut map = BTreeMap::new();
    let mut keys = Vec::new();
    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.next_u32();
        map.insert(key, key);
        keys.push(key);
    }
    let hot_keys = keys[..NUM_OF_HOT_KEYS].to_vec();

    c.bench_function("bench btreemap get hot", move |b| {
        b.iter(|| {
            for key in &hot_keys {
                black_box(map.get(key));
            }
        })
    });
}

fn bench_fibonacci_splay_cache(c: &mut Criterion) {
    c.bench_function("bench fibonacci splay_cache", |b| {
        b.iter(|| {
            let mut cache = SplayCache::new();
            black_box(fibonacci_splay(FIBONACCI_INDEX, &mut cache));
        })
    });
}

fn bench_fibonacci_hashmap(c: &mut Criterion) {
    c.bench_function("bench fibonacci hashmap", |b| {
        b.iter(|| {
            let mut cache = HashMap::new();
            black_box(fibonacci_hash(FIBONACCI_INDEX, &mut cache));
        })
    });
}

criterion_group!(
    benches,
    bench_splay_cache_insert,
    bench_splay_cache_find_hot,
    bench_btreemap_get_hot,
    bench_fibonacci_splay_cache,
    bench_fibonacci_hashmap,
);
criterion_main!(benches);
