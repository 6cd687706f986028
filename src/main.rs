mod act;
mod cli;
mod config;
mod credentials;
mod discover;
mod eligibility;
mod engine;
mod inventory;
mod model;
mod pattern;
mod platform;
mod remote;

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = cli::run(&cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
