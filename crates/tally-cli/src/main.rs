//! Tally CLI - Bank-statement analysis from the terminal
//!
//! Usage:
//!   tally init                 Initialize database
//!   tally import --file CSV    Import statement files
//!   tally recurring            Show detected recurring bills/income
//!   tally projection           Show the monthly projection
//!   tally serve --port 3000    Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let db_path = commands::resolve_db_path(cli.db.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path),
        Commands::Import { file } => commands::cmd_import(&db_path, &file),
        Commands::Status => commands::cmd_status(&db_path),
        Commands::Recurring => commands::cmd_recurring(&db_path),
        Commands::Projection => commands::cmd_projection(&db_path),
        Commands::History { starting_balance } => {
            commands::cmd_history(&db_path, starting_balance)
        }
        Commands::Outgoings { action } => commands::cmd_outgoings(&db_path, action),
        Commands::Balance { action } => commands::cmd_balance(&db_path, action),
        Commands::Serve { port, host, origin } => {
            commands::cmd_serve(&db_path, &host, port, origin).await
        }
        Commands::Clear { yes } => commands::cmd_clear(&db_path, yes),
    }
}
