//! Database layer tests

use chrono::NaiveDate;

use super::Database;
use crate::db::scheduled_outgoings::ScheduledOutgoingUpdate;
use crate::error::Error;
use crate::models::{NewRawTransaction, NewScheduledOutgoing};

fn new_raw(
    hash: &str,
    date: NaiveDate,
    amount: f64,
    subcategory: &str,
    memo: &str,
) -> NewRawTransaction {
    NewRawTransaction {
        transaction_number: None,
        date,
        account: "Current Account".to_string(),
        amount,
        subcategory: subcategory.to_string(),
        memo: memo.to_string(),
        import_hash: hash.to_string(),
    }
}

fn new_outgoing(merchant: &str, memo: &str, amount: f64) -> NewScheduledOutgoing {
    NewScheduledOutgoing {
        day_of_month: 15,
        amount,
        merchant: merchant.to_string(),
        memo: memo.to_string(),
        subcategory: "Direct Debit".to_string(),
        account: "Scheduled Outgoing".to_string(),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn insert_and_list_raw_transactions() {
    let db = Database::in_memory().unwrap();

    let id = db
        .insert_raw_transaction(&new_raw("h1", date(2024, 11, 15), 50.0, "Direct Debit", "ACME"))
        .unwrap();
    assert!(id.is_some());

    let txs = db.list_raw_transactions(None).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].amount, 50.0);
    assert_eq!(txs[0].subcategory, "Direct Debit");
    assert_eq!(txs[0].date, date(2024, 11, 15));
    assert!(txs[0].override_subcategory.is_none());
}

#[test]
fn duplicate_import_hash_is_skipped() {
    let db = Database::in_memory().unwrap();

    let first = new_raw("same", date(2024, 11, 15), 50.0, "Direct Debit", "ACME");
    assert!(db.insert_raw_transaction(&first).unwrap().is_some());
    assert!(db.insert_raw_transaction(&first).unwrap().is_none());

    let (inserted, skipped) = db
        .insert_raw_transactions(&[
            first.clone(),
            new_raw("other", date(2024, 11, 16), 20.0, "Debit", "SHOP"),
        ])
        .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(skipped, 1);
    assert_eq!(db.count_raw_transactions().unwrap(), 2);
}

#[test]
fn date_range_and_month_queries() {
    let db = Database::in_memory().unwrap();
    db.insert_raw_transaction(&new_raw("a", date(2024, 10, 5), 1.0, "Debit", "A"))
        .unwrap();
    db.insert_raw_transaction(&new_raw("b", date(2024, 11, 5), 2.0, "Debit", "B"))
        .unwrap();
    db.insert_raw_transaction(&new_raw("c", date(2024, 11, 25), 3.0, "Debit", "C"))
        .unwrap();

    let range = db
        .raw_transactions_by_date_range(date(2024, 11, 1), date(2024, 11, 10))
        .unwrap();
    assert_eq!(range.len(), 1);
    assert_eq!(range[0].memo, "B");

    let november = db.raw_transactions_by_month(2024, 11).unwrap();
    assert_eq!(november.len(), 2);

    assert!(matches!(
        db.raw_transactions_by_month(2024, 13),
        Err(Error::InvalidData(_))
    ));

    let months = db.available_months().unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].year, 2024);
    assert_eq!(months[0].month, 11);
    assert_eq!(months[1].month, 10);
}

#[test]
fn override_subcategory_round_trip() {
    let db = Database::in_memory().unwrap();
    let id = db
        .insert_raw_transaction(&new_raw("h", date(2024, 11, 15), 50.0, "Card Purchase", "ACME"))
        .unwrap()
        .unwrap();

    let updated = db
        .set_override_subcategory(id, Some("Counter Credit"))
        .unwrap();
    assert_eq!(updated.override_subcategory.as_deref(), Some("Counter Credit"));
    assert_eq!(updated.effective_category(), "counter credit");

    let cleared = db.set_override_subcategory(id, None).unwrap();
    assert!(cleared.override_subcategory.is_none());
    assert_eq!(cleared.effective_category(), "card purchase");

    assert!(matches!(
        db.set_override_subcategory(9999, Some("Debit")),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn scheduled_outgoing_crud() {
    let db = Database::in_memory().unwrap();

    let created = db
        .insert_scheduled_outgoing(&new_outgoing("Netflix", "streaming", 12.99))
        .unwrap();
    assert_eq!(created.day_of_month, 15);
    assert_eq!(created.merchant, "Netflix");

    let updated = db
        .update_scheduled_outgoing(
            created.id,
            &ScheduledOutgoingUpdate {
                amount: Some(14.99),
                day_of_month: Some(20),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.amount, 14.99);
    assert_eq!(updated.day_of_month, 20);
    assert_eq!(updated.merchant, "Netflix");

    assert!(db.delete_scheduled_outgoing(created.id).unwrap());
    assert!(!db.delete_scheduled_outgoing(created.id).unwrap());
}

#[test]
fn day_of_month_is_validated() {
    let db = Database::in_memory().unwrap();

    let mut outgoing = new_outgoing("Netflix", "streaming", 12.99);
    outgoing.day_of_month = 32;
    assert!(matches!(
        db.insert_scheduled_outgoing(&outgoing),
        Err(Error::InvalidData(_))
    ));

    outgoing.day_of_month = 0;
    assert!(matches!(
        db.insert_scheduled_outgoing(&outgoing),
        Err(Error::InvalidData(_))
    ));

    let created = db
        .insert_scheduled_outgoing(&new_outgoing("Gym", "membership", 30.0))
        .unwrap();
    assert!(matches!(
        db.update_scheduled_outgoing(
            created.id,
            &ScheduledOutgoingUpdate {
                day_of_month: Some(0),
                ..Default::default()
            },
        ),
        Err(Error::InvalidData(_))
    ));
}

#[test]
fn empty_update_is_rejected() {
    let db = Database::in_memory().unwrap();
    let created = db
        .insert_scheduled_outgoing(&new_outgoing("Gym", "membership", 30.0))
        .unwrap();

    assert!(matches!(
        db.update_scheduled_outgoing(created.id, &ScheduledOutgoingUpdate::default()),
        Err(Error::InvalidData(_))
    ));
}

#[test]
fn remove_duplicate_outgoings_keeps_the_canonical_entry() {
    let db = Database::in_memory().unwrap();
    let cheap = db
        .insert_scheduled_outgoing(&new_outgoing("Netflix", "monthly", 9.99))
        .unwrap();
    let expensive = db
        .insert_scheduled_outgoing(&new_outgoing("Netflix", "monthly", 12.99))
        .unwrap();
    let unrelated = db
        .insert_scheduled_outgoing(&new_outgoing("Gym", "membership", 30.0))
        .unwrap();

    let report = db.remove_duplicate_outgoings().unwrap();
    assert_eq!(report.count, 1);
    assert_eq!(report.removed.len(), 1);
    assert_eq!(report.removed[0].id, cheap.id);
    assert_eq!(report.removed[0].reason, "cheaper duplicate");

    let remaining = db.list_scheduled_outgoings(None, None).unwrap();
    let ids: Vec<i64> = remaining.iter().map(|o| o.id).collect();
    assert!(ids.contains(&expensive.id));
    assert!(ids.contains(&unrelated.id));
    assert!(!ids.contains(&cheap.id));

    // Second run finds nothing further to remove
    let report = db.remove_duplicate_outgoings().unwrap();
    assert_eq!(report.count, 0);
}

#[test]
fn remove_duplicate_outgoings_on_empty_store() {
    let db = Database::in_memory().unwrap();
    let report = db.remove_duplicate_outgoings().unwrap();
    assert_eq!(report.count, 0);
    assert_eq!(report.message, "No outgoings to analyze");
}

#[test]
fn balance_snapshots_and_latest() {
    let db = Database::in_memory().unwrap();

    db.add_balance_snapshot("Current Account", 1250.75, None)
        .unwrap();
    let newer = db
        .add_balance_snapshot(
            "Current Account",
            900.0,
            Some("2030-01-01T00:00:00Z".parse().unwrap()),
        )
        .unwrap();

    assert_eq!(db.list_balance_snapshots(None).unwrap().len(), 2);
    let latest = db.latest_balance_snapshot().unwrap().unwrap();
    assert_eq!(latest.id, newer.id);
    assert_eq!(latest.amount, 900.0);
}

#[test]
fn overdraft_limits_and_latest() {
    let db = Database::in_memory().unwrap();
    assert!(db.latest_overdraft_limit().unwrap().is_none());

    db.add_overdraft_limit(1000.0, None).unwrap();
    let latest = db.latest_overdraft_limit().unwrap().unwrap();
    assert_eq!(latest.amount, 1000.0);
}

#[test]
fn clear_all_data_empties_every_table() {
    let db = Database::in_memory().unwrap();
    db.insert_raw_transaction(&new_raw("h", date(2024, 11, 15), 50.0, "Debit", "ACME"))
        .unwrap();
    db.insert_scheduled_outgoing(&new_outgoing("Gym", "membership", 30.0))
        .unwrap();
    db.add_balance_snapshot("Current Account", 100.0, None)
        .unwrap();
    db.add_overdraft_limit(500.0, None).unwrap();

    db.clear_all_data().unwrap();

    assert_eq!(db.count_raw_transactions().unwrap(), 0);
    assert_eq!(db.count_scheduled_outgoings().unwrap(), 0);
    assert!(db.latest_balance_snapshot().unwrap().is_none());
    assert!(db.latest_overdraft_limit().unwrap().is_none());
}
