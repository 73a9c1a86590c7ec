use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use pubsub_api::TopicSet;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::publish::{PublishAck, PublishHandler};
use crate::session::SubscriptionSession;
use crate::store::TopicStore;

/// Owns the topic store and hands out publish and subscribe access to it.
///
/// The transport layer holds one `Arc<Broker>`; nothing here is global.
pub struct Broker {
    store: Arc<TopicStore>,
    publisher: PublishHandler,
    poll_interval: Duration,
}

impl Broker {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let store = Arc::new(TopicStore::new(config.max_messages_per_topic));
        Ok(Self {
            publisher: PublishHandler::new(store.clone()),
            store,
            poll_interval: config.poll_interval(),
        })
    }

    pub fn store(&self) -> &Arc<TopicStore> {
        &self.store
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn publish(&self, topic: impl Into<String>, content: impl Into<String>) -> PublishAck {
        self.publisher.publish(topic, content)
    }

    pub fn open_session(&self, topics: TopicSet) -> SubscriptionSession {
        SubscriptionSession::new(self.store.clone(), topics, self.poll_interval)
    }

    pub fn list_topics(&self) -> BTreeSet<String> {
        self.store.list_topics()
    }

    pub fn count_for_topic(&self, topic: &str) -> usize {
        self.store.count_for_topic(topic)
    }
}
