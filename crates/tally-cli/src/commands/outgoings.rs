//! Scheduled outgoing commands

use std::path::Path;

use anyhow::Result;
use tally_core::models::NewScheduledOutgoing;

use super::open_db;
use crate::cli::OutgoingsAction;

pub fn cmd_outgoings(db_path: &Path, action: OutgoingsAction) -> Result<()> {
    let db = open_db(db_path)?;

    match action {
        OutgoingsAction::List { merchant } => {
            let outgoings = db.list_scheduled_outgoings(merchant.as_deref(), None)?;

            if outgoings.is_empty() {
                println!("No scheduled outgoings tracked.");
                return Ok(());
            }

            println!("Scheduled outgoings");
            println!("   ─────────────────────────────");
            let mut total = 0.0;
            for outgoing in &outgoings {
                total += outgoing.amount;
                println!(
                    "   #{:<4} day {:>2}  £{:>9.2}  {}",
                    outgoing.id, outgoing.day_of_month, outgoing.amount, outgoing.merchant
                );
            }
            println!();
            println!("   {} outgoing(s), £{:.2}/month", outgoings.len(), total);
        }

        OutgoingsAction::Add {
            day,
            amount,
            merchant,
            memo,
        } => {
            let outgoing = db.insert_scheduled_outgoing(&NewScheduledOutgoing {
                day_of_month: day,
                amount,
                merchant,
                memo,
                subcategory: "Direct Debit".to_string(),
                account: "Scheduled Outgoing".to_string(),
            })?;

            println!(
                "Added #{}: £{:.2} to {} on day {}",
                outgoing.id, outgoing.amount, outgoing.merchant, outgoing.day_of_month
            );
        }

        OutgoingsAction::Remove { id } => {
            if db.delete_scheduled_outgoing(id)? {
                println!("Removed scheduled outgoing #{}", id);
            } else {
                println!("No scheduled outgoing with id {}", id);
            }
        }

        OutgoingsAction::Dedupe => {
            let report = db.remove_duplicate_outgoings()?;

            if report.removed.is_empty() {
                println!("No duplicates found.");
                return Ok(());
            }

            println!("{}", report.message);
            for removed in &report.removed {
                println!(
                    "   #{:<4} £{:>9.2}  {} ({})",
                    removed.id, removed.amount, removed.merchant, removed.reason
                );
            }
        }
    }

    Ok(())
}
