//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `resolve_db_path` / `open_db` - Shared database helpers
//! - `cmd_init` - Initialize the database
//! - `cmd_status` - Show stored-data status
//! - `cmd_clear` - Delete all stored data

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tally_core::classify::categorize;
use tally_core::db::Database;
use tally_core::stats::compute_stats;

/// Resolve the database path: explicit flag, TALLY_DB env var, or the
/// platform data directory.
pub fn resolve_db_path(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Ok(path) = std::env::var("TALLY_DB") {
        return Ok(PathBuf::from(path));
    }

    let data_dir = dirs::data_dir()
        .context("Could not determine a data directory; pass --db explicitly")?;
    Ok(data_dir.join("tally").join("tally.db"))
}

/// Open the database, creating parent directories as needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import a statement: tally import --file statement.csv");
    println!("  2. See what recurs:    tally recurring");
    println!("  3. Start the web API:  tally serve");

    Ok(())
}

pub fn cmd_status(db_path: &Path) -> Result<()> {
    let db = open_db(db_path)?;

    let raw = db.list_raw_transactions(None)?;
    let months = db.available_months()?;
    let set = categorize(&raw);
    let stats = compute_stats(&set, months.len().max(1));
    let outgoing_count = db.count_scheduled_outgoings()?;

    println!("Tally status ({})", db_path.display());
    println!("   ─────────────────────────────");
    println!("   Stored transactions: {}", raw.len());
    println!(
        "   Months of data: {}{}",
        months.len(),
        if months.is_empty() {
            String::new()
        } else {
            format!(
                " ({}-{:02} … {}-{:02})",
                months[months.len() - 1].year,
                months[months.len() - 1].month,
                months[0].year,
                months[0].month
            )
        }
    );
    println!("   Scheduled outgoings: {}", outgoing_count);
    println!();
    println!(
        "   Income:    £{:>10.2}  ({} transactions)",
        stats.total_income, stats.num_income_transactions
    );
    println!(
        "   Outgoings: £{:>10.2}  ({} transactions)",
        stats.total_outgoings, stats.num_outgoing_transactions
    );
    println!(
        "   Purchases: £{:>10.2}  ({} transactions)",
        stats.total_purchases, stats.num_purchase_transactions
    );
    println!("   Net position: £{:.2}", stats.net_position);

    if set.unclassified > 0 {
        println!();
        println!(
            "   {} transaction(s) matched no category and are excluded from totals.",
            set.unclassified
        );
    }

    Ok(())
}

pub fn cmd_clear(db_path: &Path, yes: bool) -> Result<()> {
    if !yes {
        println!("This deletes all stored transactions, outgoings, and balances.");
        println!("Re-run with --yes to confirm.");
        return Ok(());
    }

    let db = open_db(db_path)?;
    db.clear_all_data()?;
    println!("All stored data cleared.");

    Ok(())
}
