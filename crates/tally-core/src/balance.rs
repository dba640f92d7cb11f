//! Running-balance reconstruction
//!
//! Rebuilds a chronological balance series from categorized cash movements
//! and a starting balance. The series is a pure function of its inputs, so
//! callers may discard and regenerate it freely.

use crate::models::{BalancePoint, CategorizedTransaction};

/// Reconstruct a day-by-day balance trajectory.
///
/// Income contributes `+amount`, outgoings and purchases `-amount`. Events
/// are assembled income-first, then outgoings, then purchases (input order
/// preserved within each set) and stably sorted by date, so same-day
/// ordering is deterministic. One point is emitted per event at its
/// post-event balance; days without transactions get no point (calendar
/// filling is a presentation concern).
pub fn reconstruct_balance(
    income: &[CategorizedTransaction],
    outgoings: &[CategorizedTransaction],
    purchases: &[CategorizedTransaction],
    starting_balance: f64,
) -> Vec<BalancePoint> {
    let mut events: Vec<(chrono::NaiveDate, f64)> =
        Vec::with_capacity(income.len() + outgoings.len() + purchases.len());

    events.extend(income.iter().map(|tx| (tx.date, tx.amount)));
    events.extend(outgoings.iter().map(|tx| (tx.date, -tx.amount)));
    events.extend(purchases.iter().map(|tx| (tx.date, -tx.amount)));

    events.sort_by_key(|(date, _)| *date);

    let mut balance = starting_balance;
    events
        .into_iter()
        .map(|(date, delta)| {
            balance += delta;
            BalancePoint { date, balance }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::NaiveDate;

    fn income(day: u32, amount: f64) -> CategorizedTransaction {
        CategorizedTransaction {
            id: day as i64,
            date: NaiveDate::from_ymd_opt(2024, 11, day).unwrap(),
            amount,
            memo: "PAY".to_string(),
            category: Category::Income {
                source: "EMPLOYER".to_string(),
            },
        }
    }

    fn outgoing(day: u32, amount: f64) -> CategorizedTransaction {
        CategorizedTransaction {
            id: 100 + day as i64,
            date: NaiveDate::from_ymd_opt(2024, 11, day).unwrap(),
            amount,
            memo: "BILL".to_string(),
            category: Category::Outgoing {
                merchant: "UTILITY".to_string(),
            },
        }
    }

    fn purchase(day: u32, amount: f64) -> CategorizedTransaction {
        CategorizedTransaction {
            id: 200 + day as i64,
            date: NaiveDate::from_ymd_opt(2024, 11, day).unwrap(),
            amount,
            memo: "SHOP".to_string(),
            category: Category::Purchase {
                merchant: "SHOP".to_string(),
            },
        }
    }

    #[test]
    fn income_then_outgoing_arithmetic() {
        let series = reconstruct_balance(&[income(1, 50.0)], &[outgoing(2, 30.0)], &[], 100.0);

        assert_eq!(
            series,
            vec![
                BalancePoint {
                    date: NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
                    balance: 150.0
                },
                BalancePoint {
                    date: NaiveDate::from_ymd_opt(2024, 11, 2).unwrap(),
                    balance: 120.0
                },
            ]
        );
    }

    #[test]
    fn events_are_sorted_by_date_regardless_of_input_order() {
        let series = reconstruct_balance(
            &[income(20, 100.0)],
            &[outgoing(5, 10.0)],
            &[purchase(12, 20.0)],
            0.0,
        );

        let dates: Vec<u32> = series.iter().map(|p| chrono::Datelike::day(&p.date)).collect();
        assert_eq!(dates, vec![5, 12, 20]);
        assert_eq!(series.last().unwrap().balance, 70.0);
    }

    #[test]
    fn same_day_events_keep_assembly_order() {
        // Same-day tie-break: income first, then outgoings, then purchases
        let series = reconstruct_balance(
            &[income(10, 100.0)],
            &[outgoing(10, 40.0)],
            &[purchase(10, 25.0)],
            0.0,
        );

        let balances: Vec<f64> = series.iter().map(|p| p.balance).collect();
        assert_eq!(balances, vec![100.0, 60.0, 35.0]);
    }

    #[test]
    fn reconstruction_is_idempotent() {
        let inc = [income(1, 50.0), income(15, 75.0)];
        let out = [outgoing(3, 30.0)];
        let pur = [purchase(7, 12.5)];

        let first = reconstruct_balance(&inc, &out, &pur, 200.0);
        let second = reconstruct_balance(&inc, &out, &pur, 200.0);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_is_an_empty_series() {
        assert!(reconstruct_balance(&[], &[], &[], 500.0).is_empty());
    }

    #[test]
    fn single_transaction_is_a_single_point() {
        let series = reconstruct_balance(&[], &[], &[purchase(9, 19.99)], 100.0);
        assert_eq!(series.len(), 1);
        assert!((series[0].balance - 80.01).abs() < 1e-9);
    }
}
