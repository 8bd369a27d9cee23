//! Per-path request counter, fed by the visit middleware.

use std::collections::HashMap;

use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct VisitCounter {
    counts: Mutex<HashMap<String, u64>>,
}

impl VisitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, path: &str) {
        let mut counts = self.counts.lock();
        match counts.get_mut(path) {
            Some(count) => *count += 1,
            None => {
                counts.insert(path.to_string(), 1);
            }
        }
    }

    /// Visits recorded for `path`; zero if never seen.
    pub fn count(&self, path: &str) -> u64 {
        self.counts.lock().get(path).copied().unwrap_or(0)
    }
}
