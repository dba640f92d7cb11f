//! Recurring-pattern detection
//!
//! Groups categorized transactions by calendar day-of-month: a bill that hits
//! on the 15th of each month collapses into one group even across months.
//! Groups with a single member are still emitted as one-off candidates, so a
//! sparse history degrades to per-transaction coverage instead of an empty
//! result.

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use serde::Serialize;
use tracing::debug;

use crate::models::{CategorizedTransaction, RecurringGroup};

/// Detect recurring cash movements in a categorized transaction set.
///
/// Output is sorted by day-of-month. `average_amount` is the mean of the
/// group's amounts; `description` comes from the first member's
/// merchant/source, falling back to its memo.
pub fn detect_recurring(transactions: &[CategorizedTransaction]) -> Vec<RecurringGroup> {
    let mut by_day: BTreeMap<u32, Vec<&CategorizedTransaction>> = BTreeMap::new();
    for tx in transactions {
        by_day.entry(tx.date.day()).or_default().push(tx);
    }

    let mut groups = Vec::with_capacity(by_day.len());

    for (day, txs) in by_day {
        let first = match txs.first() {
            Some(tx) => *tx,
            None => continue,
        };
        let Some(kind) = first.category.kind() else {
            continue;
        };

        let average_amount = txs.iter().map(|t| t.amount).sum::<f64>() / txs.len() as f64;

        groups.push(RecurringGroup {
            day_of_month: day,
            average_amount,
            description: first.description().to_string(),
            category: kind,
            occurrences: txs.len(),
        });
    }

    debug!(
        groups = groups.len(),
        recurring = groups.iter().filter(|g| g.occurrences >= 2).count(),
        "Detected recurring groups"
    );

    groups
}

/// A transaction seen consistently across several statement months
#[derive(Debug, Clone, Serialize)]
pub struct ConsistentTransaction {
    /// Representative member of the group, carrying the average amount
    pub representative: CategorizedTransaction,
    /// Total occurrences across all months
    pub occurrences: usize,
    /// Number of distinct months the label appeared in
    pub months_present: usize,
}

/// Find transactions that appear consistently across statement months.
///
/// Groups by (normalized label, year-month); labels present in at least the
/// threshold number of months are emitted once with their average amount.
/// The threshold is every month when `num_months <= 3`, else 70% of them
/// (minimum 2).
pub fn find_consistent(
    transactions: &[CategorizedTransaction],
    num_months: usize,
) -> Vec<ConsistentTransaction> {
    if num_months == 0 {
        return Vec::new();
    }

    let threshold = if num_months <= 3 {
        num_months
    } else {
        ((num_months as f64 * 0.7) as usize).max(2)
    };

    // label -> year-month -> members
    let mut grouped: BTreeMap<String, HashMap<String, Vec<&CategorizedTransaction>>> =
        BTreeMap::new();

    for tx in transactions {
        let label = tx.description().trim().to_lowercase();
        if label.is_empty() {
            continue;
        }
        let month_key = tx.date.format("%Y-%m").to_string();
        grouped
            .entry(label)
            .or_default()
            .entry(month_key)
            .or_default()
            .push(tx);
    }

    let mut consistent = Vec::new();

    for months_data in grouped.into_values() {
        let months_present = months_data.len();
        if months_present < threshold {
            continue;
        }

        let mut amounts = Vec::new();
        let mut sample: Option<&CategorizedTransaction> = None;

        for member in months_data.values().flatten().copied() {
            amounts.push(member.amount);
            let earlier = sample.map_or(true, |s| (member.date, member.id) < (s.date, s.id));
            if earlier {
                sample = Some(member);
            }
        }

        if let Some(sample) = sample {
            let mut representative = sample.clone();
            representative.amount = amounts.iter().sum::<f64>() / amounts.len() as f64;

            consistent.push(ConsistentTransaction {
                representative,
                occurrences: amounts.len(),
                months_present,
            });
        }
    }

    debug!(
        consistent = consistent.len(),
        num_months, threshold, "Identified consistent transactions"
    );

    consistent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CashFlowKind, Category};
    use chrono::NaiveDate;

    fn tx(id: i64, year: i32, month: u32, day: u32, amount: f64, merchant: &str) -> CategorizedTransaction {
        CategorizedTransaction {
            id,
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            amount,
            memo: format!("{} MEMO", merchant),
            category: Category::Outgoing {
                merchant: merchant.to_string(),
            },
        }
    }

    #[test]
    fn groups_by_day_of_month_with_singleton_fallback() {
        // Three charges on the 5th, one on the 17th: the 5th recurs, the
        // 17th is still surfaced as a one-off candidate.
        let txs = vec![
            tx(1, 2024, 9, 5, 10.0, "GYM"),
            tx(2, 2024, 10, 5, 12.0, "GYM"),
            tx(3, 2024, 11, 5, 14.0, "GYM"),
            tx(4, 2024, 11, 17, 30.0, "WATER CO"),
        ];

        let groups = detect_recurring(&txs);
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].day_of_month, 5);
        assert_eq!(groups[0].occurrences, 3);
        assert!((groups[0].average_amount - 12.0).abs() < 1e-9);
        assert_eq!(groups[0].description, "GYM");
        assert_eq!(groups[0].category, CashFlowKind::Outgoing);

        assert_eq!(groups[1].day_of_month, 17);
        assert_eq!(groups[1].occurrences, 1);
        assert_eq!(groups[1].average_amount, 30.0);
    }

    #[test]
    fn sparse_history_yields_one_group_per_transaction() {
        let txs = vec![
            tx(1, 2024, 11, 3, 10.0, "A"),
            tx(2, 2024, 11, 9, 20.0, "B"),
            tx(3, 2024, 11, 21, 30.0, "C"),
        ];
        let groups = detect_recurring(&txs);
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.occurrences == 1));
    }

    #[test]
    fn transactions_in_different_months_share_a_day_group() {
        let txs = vec![
            tx(1, 2024, 9, 28, 40.0, "RENT"),
            tx(2, 2024, 10, 28, 40.0, "RENT"),
        ];
        let groups = detect_recurring(&txs);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].occurrences, 2);
    }

    #[test]
    fn description_falls_back_to_memo() {
        let mut a = tx(1, 2024, 11, 5, 10.0, "");
        a.memo = "RAW MEMO TEXT".to_string();
        let groups = detect_recurring(&[a]);
        assert_eq!(groups[0].description, "RAW MEMO TEXT");
    }

    #[test]
    fn empty_input_is_an_empty_result() {
        assert!(detect_recurring(&[]).is_empty());
    }

    #[test]
    fn consistent_transactions_require_presence_in_every_month_up_to_three() {
        let txs = vec![
            tx(1, 2024, 9, 5, 10.0, "GYM"),
            tx(2, 2024, 10, 5, 20.0, "GYM"),
            tx(3, 2024, 10, 12, 99.0, "ONE OFF"),
        ];

        let consistent = find_consistent(&txs, 2);
        assert_eq!(consistent.len(), 1);
        assert_eq!(consistent[0].months_present, 2);
        assert_eq!(consistent[0].occurrences, 2);
        assert!((consistent[0].representative.amount - 15.0).abs() < 1e-9);
    }

    #[test]
    fn consistent_threshold_relaxes_past_three_months() {
        // 4 months: threshold is max(2, 70% of 4) = 2
        let txs = vec![
            tx(1, 2024, 8, 5, 10.0, "GYM"),
            tx(2, 2024, 11, 5, 10.0, "GYM"),
        ];
        let consistent = find_consistent(&txs, 4);
        assert_eq!(consistent.len(), 1);
    }
}
