//! Insertion Order Module
//!
//! Tracks the order in which keys entered the store, for capacity eviction.

use std::collections::VecDeque;

// == Insertion Order ==
/// Queue of live keys ordered by first insertion.
///
/// - Front = oldest insertion (next eviction candidate)
/// - Back = newest insertion
///
/// Re-inserting a key that is already tracked leaves its position unchanged.
#[derive(Debug, Default)]
pub(crate) struct InsertionOrder {
    order: VecDeque<String>,
}

impl InsertionOrder {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record ==
    /// Appends a newly inserted key at the back.
    ///
    /// Callers only record keys that were absent from the store.
    pub fn record(&mut self, key: &str) {
        self.order.push_back(key.to_string());
    }

    // == Remove ==
    /// Forgets a key; no-op when it is not tracked.
    pub fn remove(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }

    // == Evict Oldest ==
    /// Returns and forgets the earliest inserted key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    // == Peek Oldest ==
    #[cfg(test)]
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.front()
    }

    // == Retain ==
    /// Keeps only keys accepted by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.order.retain(|k| keep(k));
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.order.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_new() {
        let order = InsertionOrder::new();
        assert!(order.is_empty());
        assert_eq!(order.peek_oldest(), None);
    }

    #[test]
    fn test_order_records_in_sequence() {
        let mut order = InsertionOrder::new();

        order.record("a");
        order.record("b");
        order.record("c");

        assert_eq!(order.len(), 3);
        assert_eq!(order.peek_oldest(), Some(&"a".to_string()));
    }

    #[test]
    fn test_order_evicts_front_first() {
        let mut order = InsertionOrder::new();
        order.record("a");
        order.record("b");
        order.record("c");

        assert_eq!(order.evict_oldest(), Some("a".to_string()));
        assert_eq!(order.evict_oldest(), Some("b".to_string()));
        assert_eq!(order.evict_oldest(), Some("c".to_string()));
        assert_eq!(order.evict_oldest(), None);
    }

    #[test]
    fn test_order_remove_then_record_moves_to_back() {
        let mut order = InsertionOrder::new();
        order.record("a");
        order.record("b");

        order.remove("a");
        order.record("a");

        assert_eq!(order.evict_oldest(), Some("b".to_string()));
        assert_eq!(order.evict_oldest(), Some("a".to_string()));
    }

    #[test]
    fn test_order_remove_nonexistent_key() {
        let mut order = InsertionOrder::new();
        order.record("a");

        order.remove("missing");

        assert_eq!(order.len(), 1);
        assert!(order.contains("a"));
    }

    #[test]
    fn test_order_retain_and_clear() {
        let mut order = InsertionOrder::new();
        order.record("city_1");
        order.record("country_1");
        order.record("city_2");

        order.retain(|k| !k.starts_with("city_"));
        assert_eq!(order.len(), 1);
        assert!(order.contains("country_1"));

        order.clear();
        assert!(order.is_empty());
    }
}
