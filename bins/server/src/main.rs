mod cmd;
mod config;
mod error;

use clap::{Parser, Subcommand};

use config::ServeArgs;

#[derive(Parser)]
#[command(name = "pubsub-server", about = "In-memory publish/subscribe broker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the broker: HTTP publish API + WebSocket subscriptions
    Serve(ServeArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let result = match Cli::parse().command {
        Commands::Serve(args) => cmd::serve::run(args).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "pubsub-server failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::parse_from([
            "pubsub-server",
            "serve",
            "--listen",
            "127.0.0.1:9000",
            "--max-messages-per-topic",
            "7",
        ]);
        let Commands::Serve(args) = cli.command;
        assert_eq!(args.listen.as_deref(), Some("127.0.0.1:9000"));
        assert_eq!(args.max_messages_per_topic, Some(7));
        assert_eq!(args.poll_interval_ms, None);
    }
}
