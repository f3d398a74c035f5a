use anyhow::Result;
use clap::Parser;
use hearth::cli::Cli;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the hearth CLI.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hearth=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("hearth starting up");

    let cli = Cli::parse();
    cli.run().await
}
