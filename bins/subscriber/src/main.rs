mod cmd;

use clap::Parser;
use cmd::config::SubscribeArgs;

#[derive(Parser)]
#[command(name = "pubsub-subscriber", about = "Streams messages from a pub/sub broker")]
struct Cli {
    #[command(flatten)]
    args: SubscribeArgs,
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

    if let Err(e) = cmd::subscribe::run(&cli.args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
