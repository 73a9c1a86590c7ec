use pubsub_api::Message;
use topic_client::SubscriptionManager;

use super::config::SubscribeArgs;
use super::error::SubscriberError;
use super::stats::Stats;

pub async fn run(args: &SubscribeArgs) -> Result<(), SubscriberError> {
    let topics = args.topic_list()?;
    let stats_interval = args.stats_interval()?;
    let stats = Stats::default();

    let mut manager = SubscriptionManager::new(&args.server);
    let recorder = stats.clone();
    manager.subscribe_to_multiple(&topics, move |topic: &str, message: &Message| {
        recorder.record(topic);
        tracing::info!(
            %topic,
            message_id = %message.message_id,
            timestamp = message.timestamp,
            content = %message.content,
            "received"
        );
    })?;
    tracing::info!(server = %args.server, ?topics, "subscribed, Ctrl+C to stop");

    let mut ticker = tokio::time::interval(stats_interval);
    ticker.tick().await;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
            _ = ticker.tick() => {
                if !manager.is_running() {
                    tracing::warn!("subscription ended");
                    break;
                }
                tracing::info!(total = stats.total(), per_topic = ?stats.snapshot(), "stats");
            }
        }
    }

    // stop() joins the worker thread
    if let Err(e) = tokio::task::spawn_blocking(move || manager.stop()).await {
        tracing::error!(error = %e, "stopping subscription failed");
    }

    tracing::info!(total = stats.total(), per_topic = ?stats.snapshot(), "subscriber finished");
    Ok(())
}
