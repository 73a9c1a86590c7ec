use std::time::Duration;

use clap::Args;

use pubsub_api::split_topics;

use super::error::PublisherError;

// ═══════════════════════════════════════════════════════════════
//  CLI args
// ═══════════════════════════════════════════════════════════════

#[derive(Args, Clone, Debug)]
pub struct PublishArgs {
    /// Адрес брокера
    #[arg(long, default_value = "http://localhost:50051", env = "PUBSUB_SERVER")]
    pub server: String,

    /// Топики через запятую (напр. news,sports)
    #[arg(long, default_value = "news")]
    pub topics: String,

    /// Текст сообщения, к нему добавляется порядковый номер
    #[arg(long, default_value = "message")]
    pub content: String,

    /// Сколько сообщений отправить (0 = пока не Ctrl+C)
    #[arg(long, default_value_t = 100)]
    pub count: u64,

    /// Пауза между сообщениями, ms
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,
}

impl PublishArgs {
    pub fn topic_list(&self) -> Result<Vec<String>, PublisherError> {
        let topics: Vec<String> = split_topics(&self.topics)
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .collect();
        if topics.is_empty() {
            return Err(PublisherError::Config("--topics must name at least one topic".into()));
        }
        Ok(topics)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: PublishArgs,
    }

    #[test]
    fn defaults() {
        let cli = TestCli::parse_from(["pubsub-publisher"]);
        assert_eq!(cli.args.count, 100);
        assert_eq!(cli.args.interval(), Duration::from_secs(1));
        assert_eq!(cli.args.topic_list().unwrap(), vec!["news"]);
    }

    #[test]
    fn topics_are_split_and_deduplicated() {
        let cli = TestCli::parse_from(["pubsub-publisher", "--topics", "b,a,b"]);
        assert_eq!(cli.args.topic_list().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn blank_topics_rejected() {
        let cli = TestCli::parse_from(["pubsub-publisher", "--topics", ","]);
        assert!(matches!(cli.args.topic_list(), Err(PublisherError::Config(_))));
    }
}
