use std::thread::JoinHandle;
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;

use pubsub_api::{Message, StreamFrame, SubscribeRequest};

use crate::error::ClientError;
use crate::ws_base;

/// Upper bound on the goodbye frame, so `stop()` never hangs on a peer
/// that stopped reading.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

// ═══════════════════════════════════════════════════════════════
//  SubscriptionManager
// ═══════════════════════════════════════════════════════════════

/// Consumes one broker subscription stream on a background worker and
/// dispatches each message to a callback.
///
/// At most one subscription is active per manager. The worker is a
/// dedicated thread with its own single-threaded runtime, so the callback
/// runs sequentially and never concurrently with itself. Dropping the
/// manager stops and joins the worker.
pub struct SubscriptionManager {
    ws_url: String,
    worker: Option<Worker>,
}

struct Worker {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl SubscriptionManager {
    /// `base_url` is the broker's HTTP address, e.g. `http://localhost:50051`.
    pub fn new(base_url: &str) -> Self {
        Self {
            ws_url: format!("{}/ws/subscribe", ws_base(base_url)),
            worker: None,
        }
    }

    pub fn subscribe<F>(&mut self, topic: &str, callback: F) -> Result<(), ClientError>
    where
        F: FnMut(&str, &Message) + Send + 'static,
    {
        self.subscribe_to_multiple(&[topic.to_string()], callback)
    }

    /// Replace any current subscription with one for `topics`. Returns once
    /// the worker is launched, without waiting for the first message.
    pub fn subscribe_to_multiple<F>(&mut self, topics: &[String], callback: F) -> Result<(), ClientError>
    where
        F: FnMut(&str, &Message) + Send + 'static,
    {
        self.stop();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let token = CancellationToken::new();
        let request = SubscribeRequest::new(topics.iter().cloned());
        let url = self.ws_url.clone();
        let worker_token = token.clone();

        let handle = std::thread::Builder::new()
            .name("pubsub-subscription".into())
            .spawn(move || {
                runtime.block_on(consume(url, request, callback, worker_token));
                tracing::info!("subscription worker terminated");
            })?;

        self.worker = Some(Worker { token, handle });
        Ok(())
    }

    /// Cancel the stream and wait for the worker to exit. Safe to call any
    /// number of times.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        worker.token.cancel();
        if worker.handle.join().is_err() {
            tracing::error!("subscription worker panicked");
        }
    }

    /// True while a worker exists and has not finished on its own.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        self.stop();
    }
}

// ═══════════════════════════════════════════════════════════════
//  Worker loop
// ═══════════════════════════════════════════════════════════════

async fn consume<F>(url: String, request: SubscribeRequest, mut callback: F, token: CancellationToken)
where
    F: FnMut(&str, &Message),
{
    tracing::info!(%url, topics = ?request.topic_set(), "subscribing");

    if let Err(e) = stream_messages(&url, &request, &mut callback, &token).await {
        if !token.is_cancelled() {
            tracing::error!(%url, error = %e, "subscription stream broken");
        }
    }
}

async fn stream_messages<F>(
    url: &str,
    request: &SubscribeRequest,
    callback: &mut F,
    token: &CancellationToken,
) -> Result<(), ClientError>
where
    F: FnMut(&str, &Message),
{
    let connected = tokio::select! {
        _ = token.cancelled() => return Ok(()),
        connected = tokio_tungstenite::connect_async(url) => connected,
    };
    let (ws_stream, _) = connected?;
    let (mut write, mut read) = ws_stream.split();

    let payload = serde_json::to_string(request)?;
    write.send(WsMessage::Text(payload.into())).await?;

    loop {
        let frame = tokio::select! {
            biased;
            _ = token.cancelled() => {
                send_close(&mut write).await;
                return Ok(());
            }
            frame = read.next() => frame,
        };

        let text = match frame {
            Some(Ok(WsMessage::Text(text))) => text,
            Some(Ok(WsMessage::Close(_))) | None => {
                tracing::info!("subscription stream closed by server");
                return Ok(());
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        };

        match serde_json::from_str::<StreamFrame>(&text) {
            Ok(StreamFrame::Message(message)) => callback(&message.topic, &message),
            Ok(StreamFrame::Error { error }) => {
                tracing::error!(%error, "broker rejected subscription");
            }
            Err(e) => tracing::warn!(error = %e, "undecodable stream frame"),
        }
    }
}

async fn send_close<S>(write: &mut S)
where
    S: Sink<WsMessage> + Unpin,
{
    if tokio::time::timeout(CLOSE_TIMEOUT, write.send(WsMessage::Close(None)))
        .await
        .is_err()
    {
        tracing::warn!("close frame not sent in time, dropping connection");
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use super::*;

    /// Sink whose peer never drains: every send stays pending.
    struct StalledSink;

    impl Sink<WsMessage> for StalledSink {
        type Error = ();

        fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), ()>> {
            Poll::Pending
        }
        fn start_send(self: Pin<&mut Self>, _item: WsMessage) -> Result<(), ()> {
            Ok(())
        }
        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), ()>> {
            Poll::Pending
        }
        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), ()>> {
            Poll::Pending
        }
    }

    #[tokio::test]
    async fn close_on_stalled_peer_gives_up() {
        let mut sink = StalledSink;
        let finished = tokio::time::timeout(CLOSE_TIMEOUT * 3, send_close(&mut sink)).await;
        assert!(finished.is_ok());
    }

    #[test]
    fn stop_without_subscription_is_noop() {
        let mut manager = SubscriptionManager::new("http://127.0.0.1:1");
        manager.stop();
        manager.stop();
        assert!(!manager.is_running());
    }

    #[test]
    fn stop_joins_worker_even_when_broker_is_unreachable() {
        // Port 1 refuses connections; the worker ends on its own or on stop.
        let mut manager = SubscriptionManager::new("http://127.0.0.1:1");
        manager.subscribe("news", |_, _| {}).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        manager.stop();
        manager.stop();
        assert!(!manager.is_running());
    }

    #[test]
    fn url_points_at_subscribe_route() {
        let manager = SubscriptionManager::new("http://localhost:50051/");
        assert_eq!(manager.ws_url, "ws://localhost:50051/ws/subscribe");
    }
}
