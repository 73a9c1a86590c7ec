pub mod error;
pub mod publisher;
pub mod subscriber;

pub use error::ClientError;
pub use publisher::PublisherClient;
pub use subscriber::SubscriptionManager;

/// `http://host:port` → `ws://host:port`, `https://` → `wss://`.
pub(crate) fn ws_base(base_url: &str) -> String {
    base_url
        .trim_end_matches('/')
        .replacen("https://", "wss://", 1)
        .replacen("http://", "ws://", 1)
}
