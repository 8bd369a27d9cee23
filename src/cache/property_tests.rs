//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check capacity, eviction order and removal semantics.

use proptest::prelude::*;
use std::collections::HashSet;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::CacheStore;

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_TTL: Duration = Duration::from_secs(600);

// == Strategies ==
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,32}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: String },
    Get { key: String },
    Remove { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    // A small key pool so operations actually collide.
    let pooled_key = (0u8..12).prop_map(|i| format!("k{}", i));
    prop_oneof![
        (pooled_key.clone(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Put { key, value }),
        pooled_key.clone().prop_map(|key| CacheOp::Get { key }),
        pooled_key.prop_map(|key| CacheOp::Remove { key }),
    ]
}

fn unique(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.into_iter().filter(|k| seen.insert(k.clone())).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Inserting MAX + k distinct keys keeps exactly MAX and drops the k earliest.
    #[test]
    fn prop_capacity_evicts_earliest_insertions(
        keys in prop::collection::vec(key_strategy(), 2..60),
        capacity in 1usize..20,
    ) {
        let keys = unique(keys);
        let store = CacheStore::new(capacity, TEST_TTL);

        for key in &keys {
            store.put(key.clone(), key.clone());
            prop_assert!(store.len() <= capacity);
        }

        let evicted = keys.len().saturating_sub(capacity);
        prop_assert_eq!(store.len(), keys.len().min(capacity));
        for key in &keys[..evicted] {
            prop_assert!(!store.contains_key(key), "{} should be evicted", key);
        }
        for key in &keys[evicted..] {
            let got = store.get(key);
            prop_assert_eq!(got.as_ref(), Some(key));
        }
    }

    // Reinserting a key does not save it from eviction.
    #[test]
    fn prop_reinsert_does_not_refresh_position(
        keys in prop::collection::vec(key_strategy(), 3..12),
        extra in key_strategy(),
    ) {
        let keys = unique(keys);
        prop_assume!(keys.len() >= 2);
        prop_assume!(!keys.contains(&extra));

        let store = CacheStore::new(keys.len(), TEST_TTL);
        for key in &keys {
            store.put(key.clone(), "first".to_string());
        }
        store.put(keys[0].clone(), "second".to_string());
        store.put(extra.clone(), "new".to_string());

        prop_assert!(!store.contains_key(&keys[0]));
        prop_assert!(store.contains_key(&keys[1]));
        prop_assert!(store.contains_key(&extra));
    }

    // Any interleaving of put/get/remove agrees with a simple model.
    #[test]
    fn prop_operations_match_model(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let store = CacheStore::new(TEST_MAX_ENTRIES, TEST_TTL);
        let mut model = std::collections::HashMap::new();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    store.put(key.clone(), value.clone());
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(store.get(&key), model.get(&key).cloned());
                }
                CacheOp::Remove { key } => {
                    store.remove(&key);
                    model.remove(&key);
                }
            }
        }

        prop_assert_eq!(store.len(), model.len());
        prop_assert_eq!(store.stats().total_entries, model.len());
    }

    // Removing an absent key never changes the store.
    #[test]
    fn prop_remove_absent_is_noop(
        keys in prop::collection::vec(key_strategy(), 0..20),
        absent in "[A-Z]{40}",
    ) {
        let store = CacheStore::new(TEST_MAX_ENTRIES, TEST_TTL);
        for key in &keys {
            store.put(key.clone(), 1u8);
        }
        let before = store.len();

        store.remove(&absent);

        prop_assert_eq!(store.len(), before);
    }
}

// Time-sensitive checks get few cases.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(4))]

    #[test]
    fn prop_expired_entries_are_never_served(
        keys in prop::collection::vec(key_strategy(), 1..10),
    ) {
        let store = CacheStore::new(TEST_MAX_ENTRIES, Duration::from_millis(40));
        for key in &keys {
            store.put(key.clone(), "value".to_string());
        }

        sleep(Duration::from_millis(80));

        for key in &keys {
            prop_assert!(!store.contains_key(key));
            prop_assert!(store.get(key).is_none());
        }
    }
}
