//! Analysis report commands: recurring, projection, balance history

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use tally_core::balance::reconstruct_balance;
use tally_core::classify::categorize;
use tally_core::models::CategorizedSet;
use tally_core::projection::project_monthly;
use tally_core::recurring::detect_recurring;

use super::open_db;

fn load_categorized(db: &tally_core::db::Database) -> Result<CategorizedSet> {
    let raw = db.list_raw_transactions(None)?;
    Ok(categorize(&raw))
}

pub fn cmd_recurring(db_path: &Path) -> Result<()> {
    let db = open_db(db_path)?;
    let set = load_categorized(&db)?;

    let mut all = set.income;
    all.extend(set.outgoings);
    all.extend(set.purchases);

    let groups = detect_recurring(&all);

    if groups.is_empty() {
        println!("No transactions to analyze. Import a statement first.");
        return Ok(());
    }

    println!("Recurring cash movements (by day of month)");
    println!("   ───────────────────────────────────────");
    for group in &groups {
        let marker = if group.occurrences >= 2 { "↻" } else { "·" };
        println!(
            "   {} day {:>2}  £{:>9.2}  {:<9} {}{}",
            marker,
            group.day_of_month,
            group.average_amount,
            group.category.to_string(),
            group.description,
            if group.occurrences >= 2 {
                format!("  ({}x)", group.occurrences)
            } else {
                String::new()
            }
        );
    }

    let recurring = groups.iter().filter(|g| g.occurrences >= 2).count();
    println!();
    println!(
        "   {} group(s), {} with a repeating pattern",
        groups.len(),
        recurring
    );

    Ok(())
}

pub fn cmd_projection(db_path: &Path) -> Result<()> {
    let db = open_db(db_path)?;
    let set = load_categorized(&db)?;

    let projection = project_monthly(
        &set.income,
        &set.outgoings,
        &set.purchases,
        Utc::now().date_naive(),
    );

    println!("Monthly projection");
    println!("   ─────────────────────────────");
    println!("   Income:     £{:>10.2}", projection.total_monthly_income);
    println!("   Outgoings:  £{:>10.2}", projection.total_monthly_outgoings);
    println!("   Purchases:  £{:>10.2}", projection.total_monthly_purchases);
    println!("   Projected:  £{:>10.2}", projection.projected_balance);

    match projection.next_income_date {
        Some(date) => println!("   Next income expected: {}", date),
        None => println!("   Next income expected: unknown (no income on record)"),
    }

    Ok(())
}

pub fn cmd_history(db_path: &Path, starting_balance: Option<f64>) -> Result<()> {
    let db = open_db(db_path)?;
    let set = load_categorized(&db)?;

    let starting_balance = match starting_balance {
        Some(balance) => balance,
        None => db
            .latest_balance_snapshot()?
            .map(|s| s.amount)
            .unwrap_or(0.0),
    };

    let series = reconstruct_balance(&set.income, &set.outgoings, &set.purchases, starting_balance);

    if series.is_empty() {
        println!("No transactions to analyze. Import a statement first.");
        return Ok(());
    }

    println!(
        "Balance history (starting from £{:.2})",
        starting_balance
    );
    println!("   ─────────────────────────────");
    for point in &series {
        println!("   {}  £{:>10.2}", point.date, point.balance);
    }

    Ok(())
}
