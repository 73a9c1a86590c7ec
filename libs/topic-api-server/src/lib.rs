mod error;
mod http;
mod ws;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use topic_engine::Broker;

pub use error::ApiError;

use http::{handle_list_topics, handle_publish, handle_topic_info};
use ws::handle_subscribe;

#[derive(Clone)]
struct AppState {
    broker: Arc<Broker>,
    ws_buffer: usize,
    /// Parent of every subscription session's token.
    shutdown: CancellationToken,
}

/// Broker routes:
///
/// - `POST /api/publish`: publish one message
/// - `GET /api/topics`: topic names
/// - `GET /api/topics/{name}`: retained message count
/// - `GET /ws/subscribe`: streaming subscription
pub fn router(broker: Arc<Broker>, ws_buffer: usize, shutdown: CancellationToken) -> Router {
    let state = AppState {
        broker,
        ws_buffer: ws_buffer.max(1),
        shutdown,
    };

    Router::new()
        .route("/api/publish", post(handle_publish))
        .route("/api/topics", get(handle_list_topics))
        .route("/api/topics/{name}", get(handle_topic_info))
        .route("/ws/subscribe", get(handle_subscribe))
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` is cancelled.
/// Cancelling also terminates every open subscription session.
pub async fn serve(
    listener: TcpListener,
    broker: Arc<Broker>,
    ws_buffer: usize,
    shutdown: CancellationToken,
) -> Result<(), ApiError> {
    let app = router(broker, ws_buffer, shutdown.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(ApiError::Serve)
}

/// Bind `addr` and serve.
pub async fn run(
    addr: &str,
    broker: Arc<Broker>,
    ws_buffer: usize,
    shutdown: CancellationToken,
) -> Result<(), ApiError> {
    let listener = TcpListener::bind(addr).await.map_err(|source| ApiError::Bind {
        addr: addr.to_string(),
        source,
    })?;
    tracing::info!(%addr, "api server (http+ws) listening");

    serve(listener, broker, ws_buffer, shutdown).await
}
