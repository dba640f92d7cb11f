//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Turn bank statements into cash-flow insight
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Self-hosted bank-statement analysis tool", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import bank statement CSV files (one file per month)
    Import {
        /// Statement CSV file(s) to import
        #[arg(short, long, required = true, num_args = 1..)]
        file: Vec<PathBuf>,
    },

    /// Show stored-data status and statement statistics
    Status,

    /// Show recurring bills and income detected by day-of-month
    Recurring,

    /// Show the monthly affordability projection
    Projection,

    /// Show the reconstructed running-balance history
    History {
        /// Starting balance (defaults to the latest recorded snapshot)
        #[arg(short, long)]
        starting_balance: Option<f64>,
    },

    /// Manage scheduled outgoings
    Outgoings {
        #[command(subcommand)]
        action: OutgoingsAction,
    },

    /// Manage balance snapshots and overdraft limits
    Balance {
        #[command(subcommand)]
        action: BalanceAction,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable)
        #[arg(long)]
        origin: Vec<String>,
    },

    /// Delete all stored data
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum OutgoingsAction {
    /// List scheduled outgoings
    List {
        /// Filter by merchant name
        #[arg(short, long)]
        merchant: Option<String>,
    },

    /// Add a scheduled outgoing
    Add {
        /// Day of month the payment leaves (1-31)
        #[arg(short, long)]
        day: u32,

        /// Payment amount
        #[arg(short, long)]
        amount: f64,

        /// Merchant name
        #[arg(short, long)]
        merchant: String,

        /// Free-text note
        #[arg(long, default_value = "")]
        memo: String,
    },

    /// Remove a scheduled outgoing by id
    Remove {
        id: i64,
    },

    /// Remove duplicate scheduled outgoings
    Dedupe,
}

#[derive(Subcommand)]
pub enum BalanceAction {
    /// Record a balance snapshot
    Set {
        /// Account name
        #[arg(short, long, default_value = "Current Account")]
        name: String,

        /// Current balance
        amount: f64,
    },

    /// Show the latest balance snapshot and overdraft limit
    Show,

    /// Record an overdraft limit
    Overdraft {
        amount: f64,
    },
}
