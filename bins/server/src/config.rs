use clap::Args;
use serde::Deserialize;

use topic_engine::EngineConfig;

use crate::error::ServerError;

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    /// Path to the TOML config file
    #[arg(long, default_value = "config.toml", env = "PUBSUB_CONFIG")]
    pub config: String,

    /// Listen address, overrides `listen` from the config
    #[arg(long, env = "PUBSUB_LISTEN")]
    pub listen: Option<String>,

    /// Retention bound per topic
    #[arg(long)]
    pub max_messages_per_topic: Option<usize>,

    /// Subscription poll interval in ms
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,
}

// ---- TOML Config ----

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Per-subscriber buffer between session and socket.
    #[serde(default = "default_ws_buffer")]
    pub ws_buffer: usize,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ws_buffer: default_ws_buffer(),
            engine: EngineConfig::default(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:50051".into()
}
fn default_ws_buffer() -> usize {
    256
}

impl ServerConfig {
    pub fn load(path: &str) -> Result<Self, ServerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config { context: "read", detail: format!("'{path}': {e}") })?;
        Self::parse(&content)
            .map_err(|detail| ServerError::Config { context: "parse", detail: format!("'{path}': {detail}") })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Config file < CLI flags. A missing file is only an error when it
    /// is not the default path.
    pub fn resolve(args: &ServeArgs) -> Result<Self, ServerError> {
        let mut config = if std::path::Path::new(&args.config).exists() {
            Self::load(&args.config)?
        } else if args.config == "config.toml" {
            tracing::info!(config = %args.config, "config file not found, using defaults");
            Self::default()
        } else {
            return Err(ServerError::Config {
                context: "read",
                detail: format!("'{}' does not exist", args.config),
            });
        };

        if let Some(listen) = &args.listen {
            config.listen = listen.clone();
        }
        if let Some(max) = args.max_messages_per_topic {
            config.engine.max_messages_per_topic = max;
        }
        if let Some(ms) = args.poll_interval_ms {
            config.engine.poll_interval_ms = ms;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(config: &str) -> ServeArgs {
        ServeArgs {
            config: config.into(),
            listen: None,
            max_messages_per_topic: None,
            poll_interval_ms: None,
        }
    }

    #[test]
    fn parses_full_config() {
        let config = ServerConfig::parse(
            r#"
            listen = "127.0.0.1:6000"
            ws_buffer = 8

            [engine]
            max_messages_per_topic = 5
            poll_interval_ms = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.listen, "127.0.0.1:6000");
        assert_eq!(config.ws_buffer, 8);
        assert_eq!(config.engine.max_messages_per_topic, 5);
        assert_eq!(config.engine.poll_interval_ms, 50);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = ServerConfig::parse("").unwrap();
        assert_eq!(config.listen, "0.0.0.0:50051");
        assert_eq!(config.engine.max_messages_per_topic, 100);
        assert_eq!(config.engine.poll_interval_ms, 100);
    }

    #[test]
    fn cli_flags_override_defaults() {
        let mut a = args("config.toml");
        a.listen = Some("127.0.0.1:7000".into());
        a.max_messages_per_topic = Some(3);
        a.poll_interval_ms = Some(10);
        // Runs from the crate dir, which has no config.toml.
        let config = ServerConfig::resolve(&a).unwrap();
        assert_eq!(config.listen, "127.0.0.1:7000");
        assert_eq!(config.engine.max_messages_per_topic, 3);
        assert_eq!(config.engine.poll_interval_ms, 10);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let result = ServerConfig::resolve(&args("/nonexistent/pubsub.toml"));
        assert!(matches!(result, Err(ServerError::Config { context: "read", .. })));
    }
}
