//! CLI command tests
//!
//! Commands are exercised against throwaway databases in a temp directory;
//! assertions check the resulting database state rather than console output.

use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::cli::{BalanceAction, OutgoingsAction};
use crate::commands;

const STATEMENT_CSV: &str = "\
Number,Date,Account,Amount,Subcategory,Memo
1,01/11/2024,Current Account,2500.00,Counter Credit,EMPLOYER LTD SALARY
2,05/11/2024,Current Account,-54.99,Direct Debit,ACME INSURANCE
3,12/11/2024,Current Account,-12.40,Card Purchase,COFFEE HOUSE
";

fn temp_db(dir: &TempDir) -> PathBuf {
    dir.path().join("tally.db")
}

fn write_statement(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn resolve_db_path_prefers_the_flag() {
    let explicit = PathBuf::from("/tmp/explicit.db");
    let resolved = commands::resolve_db_path(Some(&explicit)).unwrap();
    assert_eq!(resolved, explicit);
}

#[test]
fn open_db_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("deep/nested/tally.db");

    let db = commands::open_db(&nested).unwrap();
    assert_eq!(db.count_raw_transactions().unwrap(), 0);
    assert!(nested.exists());
}

#[test]
fn init_creates_the_database() {
    let dir = TempDir::new().unwrap();
    let db_path = temp_db(&dir);

    commands::cmd_init(&db_path).unwrap();
    assert!(db_path.exists());
}

#[test]
fn import_stores_and_classifies() {
    let dir = TempDir::new().unwrap();
    let db_path = temp_db(&dir);
    let statement = write_statement(&dir, "november.csv", STATEMENT_CSV);

    commands::cmd_import(&db_path, &[statement.clone()]).unwrap();

    let db = commands::open_db(&db_path).unwrap();
    assert_eq!(db.count_raw_transactions().unwrap(), 3);

    // Re-import is idempotent
    commands::cmd_import(&db_path, &[statement]).unwrap();
    assert_eq!(db.count_raw_transactions().unwrap(), 3);
}

#[test]
fn import_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let db_path = temp_db(&dir);

    let result = commands::cmd_import(&db_path, &[dir.path().join("missing.csv")]);
    assert!(result.is_err());
}

#[test]
fn outgoings_add_and_dedupe() {
    let dir = TempDir::new().unwrap();
    let db_path = temp_db(&dir);

    for amount in [9.99, 12.99] {
        commands::cmd_outgoings(
            &db_path,
            OutgoingsAction::Add {
                day: 15,
                amount,
                merchant: "Netflix".to_string(),
                memo: "monthly".to_string(),
            },
        )
        .unwrap();
    }

    let db = commands::open_db(&db_path).unwrap();
    assert_eq!(db.count_scheduled_outgoings().unwrap(), 2);

    commands::cmd_outgoings(&db_path, OutgoingsAction::Dedupe).unwrap();
    let remaining = db.list_scheduled_outgoings(None, None).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].amount, 12.99);
}

#[test]
fn outgoings_remove() {
    let dir = TempDir::new().unwrap();
    let db_path = temp_db(&dir);

    commands::cmd_outgoings(
        &db_path,
        OutgoingsAction::Add {
            day: 1,
            amount: 30.0,
            merchant: "Gym".to_string(),
            memo: String::new(),
        },
    )
    .unwrap();

    let db = commands::open_db(&db_path).unwrap();
    let id = db.list_scheduled_outgoings(None, None).unwrap()[0].id;

    commands::cmd_outgoings(&db_path, OutgoingsAction::Remove { id }).unwrap();
    assert_eq!(db.count_scheduled_outgoings().unwrap(), 0);

    // Removing a missing id reports rather than fails
    commands::cmd_outgoings(&db_path, OutgoingsAction::Remove { id }).unwrap();
}

#[test]
fn balance_set_and_overdraft() {
    let dir = TempDir::new().unwrap();
    let db_path = temp_db(&dir);

    commands::cmd_balance(
        &db_path,
        BalanceAction::Set {
            name: "Current Account".to_string(),
            amount: 1250.75,
        },
    )
    .unwrap();
    commands::cmd_balance(&db_path, BalanceAction::Overdraft { amount: 500.0 }).unwrap();
    commands::cmd_balance(&db_path, BalanceAction::Show).unwrap();

    let db = commands::open_db(&db_path).unwrap();
    assert_eq!(
        db.latest_balance_snapshot().unwrap().unwrap().amount,
        1250.75
    );
    assert_eq!(db.latest_overdraft_limit().unwrap().unwrap().amount, 500.0);
}

#[test]
fn clear_requires_confirmation() {
    let dir = TempDir::new().unwrap();
    let db_path = temp_db(&dir);
    let statement = write_statement(&dir, "november.csv", STATEMENT_CSV);
    commands::cmd_import(&db_path, &[statement]).unwrap();

    let db = commands::open_db(&db_path).unwrap();

    // Without --yes nothing happens
    commands::cmd_clear(&db_path, false).unwrap();
    assert_eq!(db.count_raw_transactions().unwrap(), 3);

    commands::cmd_clear(&db_path, true).unwrap();
    assert_eq!(db.count_raw_transactions().unwrap(), 0);
}

#[test]
fn reports_run_on_empty_and_populated_databases() {
    let dir = TempDir::new().unwrap();
    let db_path = temp_db(&dir);

    commands::cmd_recurring(&db_path).unwrap();
    commands::cmd_projection(&db_path).unwrap();
    commands::cmd_history(&db_path, None).unwrap();
    commands::cmd_status(&db_path).unwrap();

    let statement = write_statement(&dir, "november.csv", STATEMENT_CSV);
    commands::cmd_import(&db_path, &[statement]).unwrap();

    commands::cmd_recurring(&db_path).unwrap();
    commands::cmd_projection(&db_path).unwrap();
    commands::cmd_history(&db_path, Some(100.0)).unwrap();
    commands::cmd_status(&db_path).unwrap();
}
