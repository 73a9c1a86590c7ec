use std::sync::Arc;

use pubsub_api::{Message, MessageIdGenerator, now_ms};

use crate::store::TopicStore;

/// Acknowledgement for one accepted publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishAck {
    /// Same id as the stored message.
    pub message_id: String,
    pub seq: u64,
}

/// Stamps incoming (topic, content) pairs and appends them to the store.
pub struct PublishHandler {
    store: Arc<TopicStore>,
    ids: MessageIdGenerator,
}

impl PublishHandler {
    pub fn new(store: Arc<TopicStore>) -> Self {
        Self {
            store,
            ids: MessageIdGenerator::new(),
        }
    }

    /// Any topic is accepted, including the empty string.
    pub fn publish(&self, topic: impl Into<String>, content: impl Into<String>) -> PublishAck {
        let message = Message {
            message_id: self.ids.next_id(),
            topic: topic.into(),
            content: content.into(),
            timestamp: now_ms(),
        };
        let message_id = message.message_id.clone();
        tracing::debug!(topic = %message.topic, message_id = %message_id, "publish");

        let seq = self.store.append(message);
        PublishAck { message_id, seq }
    }
}

#[cfg(test)]
mod tests {
    use pubsub_api::TopicSet;

    use super::*;

    #[test]
    fn returned_id_matches_stored_message() {
        let store = Arc::new(TopicStore::new(10));
        let handler = PublishHandler::new(store.clone());

        let ack = handler.publish("news", "hello");

        let snap = store.snapshot(&TopicSet::from(["news".to_string()]));
        let stored = &snap["news"];
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].message().message_id, ack.message_id);
        assert_eq!(stored[0].seq(), ack.seq);
        assert_eq!(stored[0].message().content, "hello");
    }

    #[test]
    fn each_publish_appends_exactly_once() {
        let store = Arc::new(TopicStore::new(10));
        let handler = PublishHandler::new(store.clone());
        handler.publish("a", "1");
        handler.publish("a", "2");
        handler.publish("b", "3");
        assert_eq!(store.count_for_topic("a"), 2);
        assert_eq!(store.count_for_topic("b"), 1);
    }

    #[test]
    fn empty_topic_is_accepted() {
        let store = Arc::new(TopicStore::new(10));
        let handler = PublishHandler::new(store.clone());
        handler.publish("", "payload");
        assert_eq!(store.count_for_topic(""), 1);
    }

    #[test]
    fn ids_are_distinct() {
        let store = Arc::new(TopicStore::new(10));
        let handler = PublishHandler::new(store);
        let a = handler.publish("t", "x");
        let b = handler.publish("t", "x");
        assert_ne!(a.message_id, b.message_id);
        assert!(a.seq < b.seq);
    }
}
