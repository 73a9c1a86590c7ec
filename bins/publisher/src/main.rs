mod cmd;

use clap::Parser;
use cmd::config::PublishArgs;

#[derive(Parser)]
#[command(name = "pubsub-publisher", about = "Publishes messages to a pub/sub broker")]
struct Cli {
    #[command(flatten)]
    args: PublishArgs,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = cmd::publish::run(&cli.args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
