//! Transaction classification
//!
//! Maps each raw transaction to one of the three cash-flow categories by
//! matching its effective category string (user override, else the bank's
//! subcategory label) against a fixed, ordered rule table. First match wins;
//! anything unmatched is `Unclassified` and excluded from downstream totals.

use tracing::debug;

use crate::ingest::clean_merchant;
use crate::models::{
    Category, CategorizedSet, CategorizedTransaction, NewRawTransaction, RawTransaction,
};

/// Subcategory markers for incoming payments
const INCOME_MARKERS: &[&str] = &["counter credit"];

/// Subcategory markers for regular scheduled outgoings (bills, subscriptions).
/// Checked before the purchase markers so "direct debit" never falls through
/// to the bare "debit" rule.
const OUTGOING_MARKERS: &[&str] = &[
    "direct debit",
    "bill payment",
    "standing order",
    "recurring monthly payment",
    "credit payment",
];

/// Subcategory markers for discretionary purchases
const PURCHASE_MARKERS: &[&str] = &["card purchase", "debit"];

/// Classify a single transaction.
///
/// Pure and deterministic: the same (subcategory, override) pair always
/// yields the same category, and changing only the override re-routes the
/// transaction on the next pass.
pub fn classify(tx: &RawTransaction) -> Category {
    let effective = tx.effective_category();
    if effective.is_empty() {
        return Category::Unclassified;
    }

    if INCOME_MARKERS.iter().any(|m| effective.contains(m)) {
        return Category::Income {
            source: clean_merchant(&tx.memo),
        };
    }

    if OUTGOING_MARKERS.iter().any(|m| effective.contains(m)) {
        return Category::Outgoing {
            merchant: clean_merchant(&tx.memo),
        };
    }

    if PURCHASE_MARKERS.iter().any(|m| effective.contains(m)) {
        return Category::Purchase {
            merchant: clean_merchant(&tx.memo),
        };
    }

    Category::Unclassified
}

/// Classify a batch and split it into the three cash-flow sets.
///
/// Unclassified transactions are counted but excluded from every set.
pub fn categorize(transactions: &[RawTransaction]) -> CategorizedSet {
    let mut set = CategorizedSet::default();

    for tx in transactions {
        let category = classify(tx);
        let categorized = CategorizedTransaction {
            id: tx.id,
            date: tx.date,
            amount: tx.amount,
            memo: tx.memo.clone(),
            category: category.clone(),
        };

        match category {
            Category::Income { .. } => set.income.push(categorized),
            Category::Outgoing { .. } => set.outgoings.push(categorized),
            Category::Purchase { .. } => set.purchases.push(categorized),
            Category::Unclassified => set.unclassified += 1,
        }
    }

    debug!(
        income = set.income.len(),
        outgoings = set.outgoings.len(),
        purchases = set.purchases.len(),
        unclassified = set.unclassified,
        "Categorized transactions"
    );

    set
}

/// Classify a freshly parsed batch that has not been stored yet.
///
/// New transactions carry no id or override; ids in the result are 0.
pub fn categorize_new(transactions: &[NewRawTransaction]) -> CategorizedSet {
    let previews: Vec<RawTransaction> = transactions
        .iter()
        .map(|tx| RawTransaction {
            id: 0,
            transaction_number: tx.transaction_number.clone(),
            date: tx.date,
            account: tx.account.clone(),
            amount: tx.amount,
            subcategory: tx.subcategory.clone(),
            override_subcategory: None,
            memo: tx.memo.clone(),
            import_hash: tx.import_hash.clone(),
            created_at: chrono::Utc::now(),
        })
        .collect();

    categorize(&previews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn raw(subcategory: &str, override_subcategory: Option<&str>) -> RawTransaction {
        RawTransaction {
            id: 1,
            transaction_number: None,
            date: NaiveDate::from_ymd_opt(2024, 11, 15).unwrap(),
            account: "Current Account".to_string(),
            amount: 50.0,
            subcategory: subcategory.to_string(),
            override_subcategory: override_subcategory.map(|s| s.to_string()),
            memo: "ACME LTD".to_string(),
            import_hash: "hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn counter_credit_is_income() {
        assert_eq!(
            classify(&raw("Counter Credit", None)),
            Category::Income {
                source: "ACME LTD".to_string()
            }
        );
    }

    #[test]
    fn scheduled_markers_are_outgoings() {
        for marker in [
            "Direct Debit",
            "Bill Payment",
            "Standing Order",
            "Recurring Monthly Payment",
            "Credit Payment",
        ] {
            assert_eq!(
                classify(&raw(marker, None)),
                Category::Outgoing {
                    merchant: "ACME LTD".to_string()
                },
                "marker: {}",
                marker
            );
        }
    }

    #[test]
    fn card_purchase_and_debit_are_purchases() {
        for marker in ["Card Purchase", "Debit"] {
            assert!(matches!(
                classify(&raw(marker, None)),
                Category::Purchase { .. }
            ));
        }
    }

    #[test]
    fn direct_debit_never_matches_the_bare_debit_rule() {
        // "direct debit" contains "debit"; rule order keeps it an outgoing
        assert!(matches!(
            classify(&raw("Direct Debit", None)),
            Category::Outgoing { .. }
        ));
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        assert!(matches!(
            classify(&raw("COUNTER CREDIT (BACS)", None)),
            Category::Income { .. }
        ));
    }

    #[test]
    fn unknown_and_empty_labels_are_unclassified() {
        assert_eq!(classify(&raw("Cheque", None)), Category::Unclassified);
        assert_eq!(classify(&raw("", None)), Category::Unclassified);
    }

    #[test]
    fn override_moves_a_transaction_between_categories() {
        let tx = raw("Card Purchase", Some("Counter Credit"));
        assert!(matches!(classify(&tx), Category::Income { .. }));

        // Any original subcategory is overridden the same way
        let tx = raw("", Some("Counter Credit"));
        assert!(matches!(classify(&tx), Category::Income { .. }));
    }

    #[test]
    fn clearing_the_override_restores_the_original_classification() {
        let original = raw("Card Purchase", None);
        let before = classify(&original);

        let mut tx = original.clone();
        tx.override_subcategory = Some("Counter Credit".to_string());
        assert_ne!(classify(&tx), before);

        tx.override_subcategory = None;
        assert_eq!(classify(&tx), before);
    }

    #[test]
    fn categorize_splits_and_counts_unclassified() {
        let txs = vec![
            raw("Counter Credit", None),
            raw("Direct Debit", None),
            raw("Card Purchase", None),
            raw("Cheque", None),
        ];
        let set = categorize(&txs);
        assert_eq!(set.income.len(), 1);
        assert_eq!(set.outgoings.len(), 1);
        assert_eq!(set.purchases.len(), 1);
        assert_eq!(set.unclassified, 1);
    }
}
