#[derive(Debug, thiserror::Error)]
pub enum PublisherError {
    #[error("{0}")]
    Config(String),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}
