#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("publish to '{topic}' rejected")]
    Rejected { topic: String },

    #[error("spawn subscription worker: {0}")]
    Spawn(#[from] std::io::Error),
}
