use topic_client::PublisherClient;

use super::config::PublishArgs;
use super::error::PublisherError;

pub async fn run(args: &PublishArgs) -> Result<(), PublisherError> {
    let topics = args.topic_list()?;
    let mut client = PublisherClient::new(&args.server);
    client.register_topics(topics);

    tracing::info!(server = %client.base_url(), count = args.count, interval_ms = args.interval_ms, "publisher started");

    let mut interval = tokio::time::interval(args.interval());
    let mut sent = 0u64;
    let mut delivered = 0usize;

    loop {
        if args.count > 0 && sent >= args.count {
            break;
        }
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                tracing::info!("interrupted");
                break;
            }
            _ = interval.tick() => {
                sent += 1;
                let content = format!("{} #{sent}", args.content);
                delivered += client.publish_to_all(&content).await;
            }
        }
    }

    let attempted = sent as usize * client.registered_topics().len();
    tracing::info!(sent, delivered, failed = attempted - delivered, "publisher finished");
    Ok(())
}
