use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use pubsub_api::{Message, TopicSet};

use crate::store::{StoredMessage, TopicStore};

// ═══════════════════════════════════════════════════════════════
//  SubscriptionSession
// ═══════════════════════════════════════════════════════════════

/// Server-side delivery loop for one subscriber stream.
///
/// Polls the store for the subscribed topics and emits everything newer
/// than each topic's cursor, merged across topics by
/// `(timestamp, seq)`. Cursors are sequence numbers, so a message is
/// never emitted twice to the same session.
pub struct SubscriptionSession {
    store: Arc<TopicStore>,
    topics: TopicSet,
    cursors: HashMap<String, Option<u64>>,
    poll_interval: Duration,
}

impl SubscriptionSession {
    pub fn new(store: Arc<TopicStore>, topics: TopicSet, poll_interval: Duration) -> Self {
        let cursors = topics.iter().map(|t| (t.clone(), None)).collect();
        Self {
            store,
            topics,
            cursors,
            poll_interval,
        }
    }

    pub fn topics(&self) -> &TopicSet {
        &self.topics
    }

    /// Sequence number of the last message handed out for `topic`.
    pub fn cursor(&self, topic: &str) -> Option<u64> {
        self.cursors.get(topic).copied().flatten()
    }

    /// One poll iteration: collect the new batch and advance cursors past it.
    pub fn poll(&mut self) -> Vec<StoredMessage> {
        let snapshot = self.store.snapshot(&self.topics);
        let mut batch = Vec::new();

        for (topic, entries) in snapshot {
            let cursor = self.cursors.get(&topic).copied().flatten();
            let start = match cursor {
                Some(seq) => entries.partition_point(|e| e.seq() <= seq),
                None => 0,
            };
            let Some(last) = entries.last().map(StoredMessage::seq) else {
                continue;
            };
            if start < entries.len() {
                self.cursors.insert(topic, Some(last));
                batch.extend(entries.into_iter().skip(start));
            }
        }

        batch.sort_by_key(|e| (e.timestamp(), e.seq()));
        batch
    }

    /// Run until `token` is cancelled or the receiving side of `sink` is
    /// dropped. Returns the number of messages delivered.
    pub async fn run(mut self, sink: mpsc::Sender<Arc<Message>>, token: CancellationToken) -> u64 {
        tracing::info!(topics = ?self.topics, "subscription session started");
        let mut delivered = 0u64;

        'poll: loop {
            if token.is_cancelled() {
                break;
            }

            for entry in self.poll() {
                tracing::trace!(topic = %entry.topic(), seq = entry.seq(), "deliver");
                let sent = tokio::select! {
                    biased;
                    _ = token.cancelled() => break 'poll,
                    sent = sink.send(entry.message().clone()) => sent,
                };
                if sent.is_err() {
                    break 'poll;
                }
                delivered += 1;
            }

            tokio::select! {
                _ = token.cancelled() => break,
                _ = sink.closed() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        tracing::info!(topics = ?self.topics, delivered, "subscription session terminated");
        delivered
    }
}
