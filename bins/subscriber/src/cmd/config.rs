use std::time::Duration;

use clap::Args;

use pubsub_api::split_topics;

use super::error::SubscriberError;

#[derive(Args, Clone, Debug)]
pub struct SubscribeArgs {
    /// Адрес брокера
    #[arg(long, default_value = "http://localhost:50051", env = "PUBSUB_SERVER")]
    pub server: String,

    /// Топики через запятую
    #[arg(long, default_value = "news")]
    pub topics: String,

    /// Как часто печатать статистику, секунды
    #[arg(long, default_value_t = 5)]
    pub stats_every: u64,
}

impl SubscribeArgs {
    pub fn topic_list(&self) -> Result<Vec<String>, SubscriberError> {
        let topics: Vec<String> = split_topics(&self.topics)
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .collect();
        if topics.is_empty() {
            return Err(SubscriberError::Config("--topics must name at least one topic".into()));
        }
        Ok(topics)
    }

    pub fn stats_interval(&self) -> Result<Duration, SubscriberError> {
        if self.stats_every == 0 {
            return Err(SubscriberError::Config("--stats-every must be > 0".into()));
        }
        Ok(Duration::from_secs(self.stats_every))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: SubscribeArgs,
    }

    #[test]
    fn topics_split_on_comma() {
        let cli = TestCli::parse_from(["pubsub-subscriber", "--topics", "sports,news"]);
        assert_eq!(cli.args.topic_list().unwrap(), vec!["news", "sports"]);
    }

    #[test]
    fn trailing_comma_does_not_add_empty_topic() {
        let cli = TestCli::parse_from(["pubsub-subscriber", "--topics", "news,"]);
        assert_eq!(cli.args.topic_list().unwrap(), vec!["news"]);
    }

    #[test]
    fn blank_topics_rejected() {
        let cli = TestCli::parse_from(["pubsub-subscriber", "--topics", " , "]);
        assert!(matches!(cli.args.topic_list(), Err(SubscriberError::Config(_))));
    }

    #[test]
    fn zero_stats_interval_rejected() {
        let cli = TestCli::parse_from(["pubsub-subscriber", "--stats-every", "0"]);
        assert!(cli.args.stats_interval().is_err());
    }
}
