pub mod broker;
pub mod config;
pub mod error;
pub mod publish;
pub mod session;
pub mod store;

pub use broker::Broker;
pub use config::EngineConfig;
pub use error::EngineError;
pub use publish::{PublishAck, PublishHandler};
pub use session::SubscriptionSession;
pub use store::{StoredMessage, TopicStore};
