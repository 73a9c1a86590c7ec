use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use topic_engine::Broker;

use crate::config::{ServeArgs, ServerConfig};
use crate::error::ServerError;

pub async fn run(args: ServeArgs) -> Result<(), ServerError> {
    tracing::info!("pubsub-server starting");

    // --- Load config ---
    let config = ServerConfig::resolve(&args)?;
    let broker = Arc::new(Broker::new(&config.engine)?);
    tracing::info!(
        listen = %config.listen,
        max_messages_per_topic = config.engine.max_messages_per_topic,
        poll_interval_ms = config.engine.poll_interval_ms,
        ws_buffer = config.ws_buffer,
        "broker configured"
    );

    // --- CancellationToken for graceful shutdown ---
    let token = CancellationToken::new();

    // --- API server (HTTP + WS) ---
    let mut api_handle = tokio::spawn({
        let broker = broker.clone();
        let token = token.clone();
        let listen = config.listen.clone();
        let ws_buffer = config.ws_buffer;
        async move { topic_api_server::run(&listen, broker, ws_buffer, token).await }
    });

    // --- Ctrl+C or api server failure ---
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("shutting down...");
        }
        result = &mut api_handle => {
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e.into()),
                Err(e) => {
                    tracing::error!(error = %e, "api server task failed");
                    Ok(())
                }
            };
        }
    }

    token.cancel();

    // Drain: wait up to 5s for the server to finish gracefully
    if tokio::time::timeout(Duration::from_secs(5), &mut api_handle).await.is_err() {
        tracing::warn!("api server did not stop in time, aborting");
        api_handle.abort();
    }

    for topic in broker.list_topics() {
        tracing::info!(%topic, retained = broker.count_for_topic(&topic), "topic at shutdown");
    }
    tracing::info!("shutdown complete");
    Ok(())
}
