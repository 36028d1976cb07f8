#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use tailfunnel::Config;
use tailfunnel::app::dispatch::dispatch;
use tailfunnel::cli::Cli;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn log_level(verbose: bool) -> Level {
    let from_env = std::env::var("TAILFUNNEL_LOG")
        .ok()
        .and_then(|raw| raw.trim().parse::<Level>().ok());
    match (from_env, verbose) {
        (Some(level), _) => level,
        (None, true) => Level::DEBUG,
        (None, false) => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(cli.verbose))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load(cli.config.as_deref())?;
    dispatch(cli, config).await
}
