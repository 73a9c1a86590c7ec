#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("axum serve: {0}")]
    Serve(#[source] std::io::Error),
}
