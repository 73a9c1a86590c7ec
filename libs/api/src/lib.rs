pub mod util;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use util::{MessageIdGenerator, now_ms};

// ════════════════════════════════════════════════════════════════
//  Message
// ════════════════════════════════════════════════════════════════

/// Сообщение, опубликованное в topic. Неизменяемо после создания.
///
/// `message_id` — непрозрачный handle для клиента; порядок доставки
/// определяется не им, а sequence number, который назначает store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Уникальный id, назначенный брокером при публикации.
    pub message_id: String,
    /// Канал, к которому относится сообщение.
    pub topic: String,
    /// Непрозрачный payload.
    pub content: String,
    /// Время создания, Unix ms.
    pub timestamp: i64,
}

// ════════════════════════════════════════════════════════════════
//  Publish
// ════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub topic: String,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponse {
    pub success: bool,
    pub message_id: String,
}

/// Retained message count of one topic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicInfo {
    pub topic: String,
    pub count: usize,
}

// ════════════════════════════════════════════════════════════════
//  Subscribe
// ════════════════════════════════════════════════════════════════

/// Normalised, ordered set of topic names a subscriber listens to.
pub type TopicSet = BTreeSet<String>;

/// First frame a subscriber sends on the stream.
///
/// `topics` wins when non-empty; otherwise the legacy `topic` field is
/// split on `,`. Both fields are optional on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub topic: String,
}

impl SubscribeRequest {
    pub fn new<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topics: topics.into_iter().map(Into::into).collect(),
            topic: String::new(),
        }
    }

    /// Request in the legacy single-field form, e.g. `"news,sports"`.
    pub fn legacy(topic: impl Into<String>) -> Self {
        Self {
            topics: Vec::new(),
            topic: topic.into(),
        }
    }

    pub fn topic_set(&self) -> TopicSet {
        if self.topics.is_empty() {
            split_topics(&self.topic)
        } else {
            self.topics.iter().cloned().collect()
        }
    }
}

/// Split a comma-separated topic list. Segments are kept verbatim, so
/// `""` yields the single empty-named topic.
pub fn split_topics(list: &str) -> TopicSet {
    list.split(',').map(str::to_string).collect()
}

// ════════════════════════════════════════════════════════════════
//  Stream frames (server → subscriber)
// ════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamFrame {
    Message(Message),
    Error { error: String },
}
