//! Statement import command

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use tally_core::classify::categorize_new;
use tally_core::ingest::parse_statement_csv;
use tally_core::models::NewRawTransaction;
use tally_core::recurring::find_consistent;

use super::open_db;

pub fn cmd_import(db_path: &Path, files: &[PathBuf]) -> Result<()> {
    let db = open_db(db_path)?;
    let num_months = files.len();

    println!("Importing {} statement file(s)...", num_months);

    let mut batch: Vec<NewRawTransaction> = Vec::new();
    for file in files {
        let reader = std::fs::File::open(file)
            .with_context(|| format!("Failed to open {}", file.display()))?;
        let parsed = parse_statement_csv(reader)
            .with_context(|| format!("Failed to parse {}", file.display()))?;

        println!("   {}: {} transactions", file.display(), parsed.len());
        batch.extend(parsed);
    }

    let (inserted, skipped) = db.insert_raw_transactions(&batch)?;
    let set = categorize_new(&batch);
    info!(inserted, skipped, files = num_months, "Statement import finished");

    println!();
    println!("Import complete");
    println!("   ─────────────────────────────");
    println!("   Stored:     {} (skipped {} already-seen)", inserted, skipped);
    println!("   Income:     {}", set.income.len());
    println!("   Outgoings:  {}", set.outgoings.len());
    println!("   Purchases:  {}", set.purchases.len());
    if set.unclassified > 0 {
        println!("   Unmatched:  {} (excluded from analysis)", set.unclassified);
    }

    if num_months > 1 {
        let consistent_outgoings = find_consistent(&set.outgoings, num_months);
        let consistent_income = find_consistent(&set.income, num_months);
        println!();
        println!(
            "   Across {} months: {} consistent outgoing(s), {} consistent income source(s)",
            num_months,
            consistent_outgoings.len(),
            consistent_income.len()
        );
    }

    println!();
    println!("Next: tally recurring, tally projection");

    Ok(())
}
