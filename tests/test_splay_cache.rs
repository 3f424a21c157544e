use rand::Rng;
use splay_collections::splay_cache::SplayCache;
use std::collections::BTreeMap;

const NUM_OF_OPERATIONS: usize = 10_000;
const NUM_OF_HOT_KEYS: usize = 8;

fn fibonacci(n: u64, cache: &mut SplayCache<u64, u64>) -> u64 {
    if let Some(&value) = cache.find(&n) {
        return value;
    }
    let value = if n < 2 {
        n
    } else {
        fibonacci(n - 1, cache) + fibonacci(n - 2, cache)
    };
    cache.insert(n, value);
    value
}

#[test]
fn int_test_splay_cache() {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    let mut cache = SplayCache::new();
    let mut expected = BTreeMap::new();
    let mut keys = Vec::new();

    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.gen::<u32>();
        let val = rng.gen::<u32>();

        let inserted = cache.insert(key, val);
        assert_eq!(inserted, !expected.contains_key(&key));
        if inserted {
            keys.push(key);
        }
        expected.entry(key).or_insert(val);
    }

    assert_eq!(cache.len(), expected.len());
    assert_eq!(
        cache.iter().collect::<Vec<(&u32, &u32)>>(),
        expected.iter().collect::<Vec<(&u32, &u32)>>(),
    );

    for i in 0..NUM_OF_OPERATIONS {
        let key = if i % 2 == 0 {
            keys[rng.gen_range(0, keys.len())]
        } else {
            rng.gen::<u32>()
        };

        let root_before = cache.root().map(|(&key, _)| key);
        assert_eq!(cache.find(&key), expected.get(&key));
        if expected.contains_key(&key) {
            assert_eq!(cache.root().map(|(&key, _)| key), Some(key));
        } else {
            assert_eq!(cache.root().map(|(&key, _)| key), root_before);
        }

        if i % 500 == 0 {
            assert_eq!(cache.check_invariants(), Ok(()));
        }
    }

    assert_eq!(cache.check_invariants(), Ok(()));
    assert_eq!(
        cache.iter().collect::<Vec<(&u32, &u32)>>(),
        expected.iter().collect::<Vec<(&u32, &u32)>>(),
    );
}

#[test]
fn int_test_random_workload() {
    let mut rng = rand::thread_rng();
    let mut cache = SplayCache::with_chunk_size(64);
    let mut expected = BTreeMap::new();
    let mut finds = 0;
    let mut hits = 0;

    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.gen_range(0, 1000u32);
        if rng.gen::<bool>() {
            let val = rng.gen::<u32>();
            cache.insert(key, val);
            expected.entry(key).or_insert(val);
        } else {
            finds += 1;
            if expected.contains_key(&key) {
                hits += 1;
            }
            assert_eq!(cache.find(&key), expected.get(&key));
        }
    }

    assert_eq!(cache.len(), expected.len());
    assert_eq!(cache.check_invariants(), Ok(()));

    let stats = cache.stats();
    assert_eq!(stats.hits, hits);
    assert_eq!(stats.hits + stats.misses, finds);
}

#[test]
fn int_test_hot_keys_move_toward_root() {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([2, 3, 5, 7]);
    let mut cache = SplayCache::new();
    let mut baseline = SplayCache::new();
    let mut keys = Vec::new();

    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.gen::<u32>();
        if cache.insert(key, key) {
            baseline.insert(key, key);
            keys.push(key);
        }
    }

    let hot_keys = keys[keys.len() - NUM_OF_HOT_KEYS..].to_vec();
    for i in 0..NUM_OF_OPERATIONS {
        let key = rng.gen::<u32>();
        if cache.insert(key, key) {
            baseline.insert(key, key);
        }
        let hot_key = hot_keys[i % NUM_OF_HOT_KEYS];
        assert_eq!(cache.find(&hot_key), Some(&hot_key));
    }

    let average_depth = |cache: &SplayCache<u32, u32>| {
        let total: usize = hot_keys
            .iter()
            .map(|key| cache.depth(key).unwrap())
            .sum();
        total as f64 / NUM_OF_HOT_KEYS as f64
    };

    assert!(average_depth(&cache) < average_depth(&baseline));
    assert_eq!(cache.check_invariants(), Ok(()));
    assert_eq!(baseline.stats().hits, 0);
}

#[test]
fn int_test_fibonacci_memoization() {
    let mut cache = SplayCache::new();
    let (mut previous, mut current) = (0u64, 1u64);
    for _ in 1..90 {
        let next = previous + current;
        previous = current;
        current = next;
    }

    assert_eq!(fibonacci(90, &mut cache), current);
    assert_eq!(cache.len(), 91);
    assert_eq!(cache.stats().misses, 91);

    assert_eq!(fibonacci(90, &mut cache), current);
    assert_eq!(cache.root(), Some((&90, &current)));
    assert_eq!(cache.check_invariants(), Ok(()));
}

#[test]
fn int_test_cache_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<SplayCache<u32, String>>();
}
