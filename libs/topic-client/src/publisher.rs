use pubsub_api::{PublishRequest, PublishResponse, TopicInfo};

use crate::error::ClientError;

/// HTTP client for the broker's publish and introspection endpoints.
pub struct PublisherClient {
    http: reqwest::Client,
    base_url: String,
    registered_topics: Vec<String>,
}

impl PublisherClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            registered_topics: Vec::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn publish(&self, topic: &str, content: &str) -> Result<PublishResponse, ClientError> {
        let request = PublishRequest {
            topic: topic.to_string(),
            content: content.to_string(),
        };
        let response: PublishResponse = self
            .http
            .post(format!("{}/api/publish", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.success {
            return Err(ClientError::Rejected {
                topic: topic.to_string(),
            });
        }
        tracing::info!(%topic, message_id = %response.message_id, "message published");
        Ok(response)
    }

    /// Publish `content` to each topic. Returns how many publishes succeeded.
    pub async fn publish_to_multiple(&self, topics: &[String], content: &str) -> usize {
        let mut success = 0;
        for topic in topics {
            match self.publish(topic, content).await {
                Ok(_) => success += 1,
                Err(e) => tracing::error!(%topic, error = %e, "publish failed"),
            }
        }
        success
    }

    /// Set the default topics used by [`Self::publish_to_all`].
    pub fn register_topics(&mut self, topics: Vec<String>) {
        tracing::info!(count = topics.len(), ?topics, "registered topics");
        self.registered_topics = topics;
    }

    pub fn registered_topics(&self) -> &[String] {
        &self.registered_topics
    }

    pub async fn publish_to_all(&self, content: &str) -> usize {
        if self.registered_topics.is_empty() {
            tracing::info!("no registered topics, message not published");
            return 0;
        }
        self.publish_to_multiple(&self.registered_topics, content).await
    }

    pub async fn list_topics(&self) -> Result<Vec<String>, ClientError> {
        Ok(self
            .http
            .get(format!("{}/api/topics", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    pub async fn topic_info(&self, topic: &str) -> Result<TopicInfo, ClientError> {
        Ok(self
            .http
            .get(format!("{}/api/topics/{topic}", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}
