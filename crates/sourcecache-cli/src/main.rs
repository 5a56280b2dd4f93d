//! sourcecache CLI - resolve debugger source identifiers to their text
//!
//! This is the main entry point for the sourcecache command-line interface.
//! Command implementations live in [`commands`].

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod utils;

use cli::{Cli, Commands};
use utils::logging::initialize_logging;
use utils::settings::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    execute_command(cli).await
}

async fn execute_command(cli: Cli) -> Result<()> {
    let format = cli.format;
    let config = || load_config(cli.config.as_deref());

    match cli.command {
        Commands::Line { id, line } => {
            commands::execute_line(&id, line, &config()?, format).await?;
        },

        Commands::Text {
            id,
            method,
            post_data,
        } => {
            commands::execute_text(
                &id,
                method.as_deref(),
                post_data.as_deref(),
                &config()?,
                format,
            )
            .await?;
        },

        Commands::Raw { id } => {
            commands::execute_raw(&id, &config()?, format).await?;
        },

        Commands::Classify { id } => {
            commands::execute_classify(&id, format)?;
        },
    }

    Ok(())
}
