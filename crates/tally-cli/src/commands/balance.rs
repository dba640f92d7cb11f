//! Balance snapshot and overdraft commands

use std::path::Path;

use anyhow::Result;

use super::open_db;
use crate::cli::BalanceAction;

pub fn cmd_balance(db_path: &Path, action: BalanceAction) -> Result<()> {
    let db = open_db(db_path)?;

    match action {
        BalanceAction::Set { name, amount } => {
            let snapshot = db.add_balance_snapshot(&name, amount, None)?;
            println!(
                "Recorded balance £{:.2} for {} at {}",
                snapshot.amount,
                snapshot.name,
                snapshot.recorded_at.format("%Y-%m-%d %H:%M")
            );
        }

        BalanceAction::Show => {
            match db.latest_balance_snapshot()? {
                Some(snapshot) => println!(
                    "Latest balance: £{:.2} ({}, recorded {})",
                    snapshot.amount,
                    snapshot.name,
                    snapshot.recorded_at.format("%Y-%m-%d %H:%M")
                ),
                None => println!("No balance recorded. Use: tally balance set <amount>"),
            }

            match db.latest_overdraft_limit()? {
                Some(limit) => println!("Overdraft limit: £{:.2}", limit.amount),
                None => println!("No overdraft limit recorded."),
            }
        }

        BalanceAction::Overdraft { amount } => {
            let limit = db.add_overdraft_limit(amount, None)?;
            println!("Recorded overdraft limit £{:.2}", limit.amount);
        }
    }

    Ok(())
}
