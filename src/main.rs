mod auth;
mod cli;
mod commands;
mod config;
mod console;
mod error;
mod output;
mod providers;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting gitlab-helper");
    cli.execute().await?;

    Ok(())
}
