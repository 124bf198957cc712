use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moneta::cli::{run_command, Cli};
use moneta::client::ApiError;
use moneta::config::Config;
use moneta::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config)?;
    if let Some(api_url) = &cli.api_url {
        config.api.base_url = api_url.clone();
    }

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("moneta v{}", env!("CARGO_PKG_VERSION"));

    let ctx = AppContext::new(config)?;

    match run_command(&cli, &ctx).await {
        Ok(()) => Ok(()),
        Err(err) => {
            // API failures were already surfaced as a toast by the HTTP
            // layer; exit non-zero without repeating the message.
            if err.downcast_ref::<ApiError>().is_some() {
                std::process::exit(1);
            }
            Err(err)
        }
    }
}
