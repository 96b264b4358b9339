//! postdeck-cli: headless client for the remote post resource.

#![deny(clippy::all, clippy::pedantic)]

mod args;
mod client;
mod handlers;
mod io;
mod print;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use args::Cli;
use client::{CliError, build_ctx_from_cli};
use handlers::posts;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_writer(std::io::stderr)
                .with_filter(
                    EnvFilter::builder()
                        .with_default_directive(LevelFilter::WARN.into())
                        .from_env_lossy(),
                ),
        )
        .init();

    let cli = Cli::parse();
    let ctx = build_ctx_from_cli(&cli)?;
    posts::handle(&ctx, cli.command).await
}
