use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Per-topic delivery counters shared between the subscription callback
/// and the reporting loop.
#[derive(Clone, Default)]
pub struct Stats {
    counts: Arc<Mutex<BTreeMap<String, u64>>>,
}

impl Stats {
    pub fn record(&self, topic: &str) {
        let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        *counts.entry(topic.to_string()).or_default() += 1;
    }

    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn total(&self) -> u64 {
        self.snapshot().values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_per_topic() {
        let stats = Stats::default();
        let shared = stats.clone();
        shared.record("a");
        shared.record("b");
        stats.record("a");

        let snap = stats.snapshot();
        assert_eq!(snap["a"], 2);
        assert_eq!(snap["b"], 1);
        assert_eq!(stats.total(), 3);
    }
}
