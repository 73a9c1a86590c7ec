use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use pubsub_api::{Message, TopicSet};

// ═══════════════════════════════════════════════════════════════
//  StoredMessage
// ═══════════════════════════════════════════════════════════════

/// A message as held by the store: shared payload plus the sequence
/// number assigned at append time.
///
/// `seq` grows strictly with append order across all topics and is the
/// only ordering key used for delivery cursors.
#[derive(Clone, Debug)]
pub struct StoredMessage {
    seq: u64,
    message: Arc<Message>,
}

impl StoredMessage {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn message(&self) -> &Arc<Message> {
        &self.message
    }

    pub fn topic(&self) -> &str {
        &self.message.topic
    }

    pub fn timestamp(&self) -> i64 {
        self.message.timestamp
    }
}

// ═══════════════════════════════════════════════════════════════
//  TopicStore
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct Inner {
    topics: HashMap<String, VecDeque<StoredMessage>>,
    next_seq: u64,
}

/// Bounded per-topic append log, shared by publishers and sessions.
///
/// All reads and writes go through one lock, so no reader ever sees an
/// append without its eviction. Snapshots copy `Arc` handles only.
#[derive(Debug)]
pub struct TopicStore {
    inner: RwLock<Inner>,
    max_messages_per_topic: usize,
}

impl TopicStore {
    /// A bound of zero is treated as one.
    pub fn new(max_messages_per_topic: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            max_messages_per_topic: max_messages_per_topic.max(1),
        }
    }

    pub fn max_messages_per_topic(&self) -> usize {
        self.max_messages_per_topic
    }

    /// Append to the tail of `message.topic`, evicting the oldest entries
    /// beyond the bound. Returns the assigned sequence number.
    pub fn append(&self, message: Message) -> u64 {
        let mut inner = self.write();
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let bound = self.max_messages_per_topic;
        let log = inner.topics.entry(message.topic.clone()).or_default();
        log.push_back(StoredMessage {
            seq,
            message: Arc::new(message),
        });
        if log.len() > bound {
            let excess = log.len() - bound;
            log.drain(..excess);
            tracing::trace!(evicted = excess, "topic over retention bound");
        }
        seq
    }

    /// Point-in-time copy of the requested topics, oldest first.
    /// Unknown topics map to an empty vector.
    pub fn snapshot(&self, topics: &TopicSet) -> BTreeMap<String, Vec<StoredMessage>> {
        let inner = self.read();
        topics
            .iter()
            .map(|name| {
                let entries: Vec<StoredMessage> = inner
                    .topics
                    .get(name)
                    .map(|log| log.iter().cloned().collect())
                    .unwrap_or_default();
                (name.clone(), entries)
            })
            .collect()
    }

    pub fn list_topics(&self) -> BTreeSet<String> {
        self.read().topics.keys().cloned().collect()
    }

    pub fn count_for_topic(&self, topic: &str) -> usize {
        self.read().topics.get(topic).map_or(0, VecDeque::len)
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        match self.inner.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("topic store read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        match self.inner.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("topic store write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn test_message(topic: &str, content: &str, timestamp: i64) -> Message {
    Message {
        message_id: format!("{topic}-{content}"),
        topic: topic.to_string(),
        content: content.to_string(),
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(names: &[&str]) -> TopicSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn contents(entries: &[StoredMessage]) -> Vec<&str> {
        entries.iter().map(|e| e.message().content.as_str()).collect()
    }

    #[test]
    fn snapshot_preserves_publish_order() {
        let store = TopicStore::new(100);
        for i in 0..10 {
            store.append(test_message("t", &format!("m{i}"), 0));
        }
        let snap = store.snapshot(&topics(&["t"]));
        let expected: Vec<String> = (0..10).map(|i| format!("m{i}")).collect();
        assert_eq!(contents(&snap["t"]), expected);
    }

    #[test]
    fn eviction_keeps_most_recent() {
        let store = TopicStore::new(2);
        store.append(test_message("t", "m1", 1));
        store.append(test_message("t", "m2", 2));
        store.append(test_message("t", "m3", 3));

        assert_eq!(store.count_for_topic("t"), 2);
        let snap = store.snapshot(&topics(&["t"]));
        assert_eq!(contents(&snap["t"]), vec!["m2", "m3"]);
    }

    #[test]
    fn eviction_with_larger_overflow() {
        let store = TopicStore::new(5);
        for i in 0..12 {
            store.append(test_message("t", &format!("m{i}"), i));
        }
        let snap = store.snapshot(&topics(&["t"]));
        assert_eq!(contents(&snap["t"]), vec!["m7", "m8", "m9", "m10", "m11"]);
    }

    #[test]
    fn eviction_is_per_topic() {
        let store = TopicStore::new(1);
        store.append(test_message("a", "a1", 0));
        store.append(test_message("b", "b1", 0));
        store.append(test_message("a", "a2", 0));
        assert_eq!(store.count_for_topic("a"), 1);
        assert_eq!(store.count_for_topic("b"), 1);
    }

    #[test]
    fn unknown_topic_is_empty() {
        let store = TopicStore::new(10);
        let snap = store.snapshot(&topics(&["missing"]));
        assert!(snap["missing"].is_empty());
        assert_eq!(store.count_for_topic("missing"), 0);
        assert!(store.list_topics().is_empty());
    }

    #[test]
    fn sequence_numbers_follow_append_order() {
        let store = TopicStore::new(10);
        let a = store.append(test_message("a", "1", 0));
        let b = store.append(test_message("b", "2", 0));
        let c = store.append(test_message("a", "3", 0));
        assert!(a < b && b < c);
    }

    #[test]
    fn list_topics_reports_every_written_topic() {
        let store = TopicStore::new(10);
        store.append(test_message("news", "x", 0));
        store.append(test_message("", "y", 0));
        assert_eq!(store.list_topics(), topics(&["", "news"]));
    }

    #[test]
    fn zero_bound_behaves_as_one() {
        let store = TopicStore::new(0);
        assert_eq!(store.max_messages_per_topic(), 1);
        store.append(test_message("t", "a", 0));
        store.append(test_message("t", "b", 0));
        assert_eq!(store.count_for_topic("t"), 1);
    }

    #[test]
    fn concurrent_appends_respect_bound_and_order() {
        let store = TopicStore::new(50);
        std::thread::scope(|s| {
            for w in 0..8 {
                let store = &store;
                s.spawn(move || {
                    for i in 0..200 {
                        store.append(test_message("t", &format!("{w}-{i}"), 0));
                    }
                });
            }
            s.spawn(|| {
                for _ in 0..200 {
                    let snap = store.snapshot(&topics(&["t"]));
                    let entries = &snap["t"];
                    assert!(entries.len() <= 50);
                    assert!(entries.windows(2).all(|w| w[0].seq() < w[1].seq()));
                }
            });
        });

        let snap = store.snapshot(&topics(&["t"]));
        assert_eq!(snap["t"].len(), 50);
        assert_eq!(snap["t"].last().map(StoredMessage::seq), Some(8 * 200 - 1));
    }
}
