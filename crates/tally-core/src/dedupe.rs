//! Scheduled-outgoing de-duplication
//!
//! Imports and manual entry can both track the same bill. The resolver
//! groups scheduled outgoings by their normalized (merchant, memo) pair and
//! keeps one canonical entry per group: the highest amount, lowest id on
//! ties. Everything else is planned for removal with a reason.
//!
//! Planning is pure; `Database::remove_duplicate_outgoings` applies a plan
//! atomically.

use std::collections::BTreeMap;

use crate::models::{RemovedOutgoing, ScheduledOutgoing};

/// The outcome of planning a de-duplication pass
#[derive(Debug, Clone, Default)]
pub struct DedupePlan {
    /// Entries that survive, one per (merchant, memo) group
    pub kept: Vec<ScheduledOutgoing>,
    /// Entries to delete, with per-entry reasons
    pub removed: Vec<RemovedOutgoing>,
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Plan which scheduled outgoings to remove.
///
/// Deterministic: repeated invocations over the same collection always keep
/// and remove the same entries.
pub fn plan_removals(outgoings: &[ScheduledOutgoing]) -> DedupePlan {
    let mut groups: BTreeMap<(String, String), Vec<&ScheduledOutgoing>> = BTreeMap::new();
    for outgoing in outgoings {
        let key = (normalize(&outgoing.merchant), normalize(&outgoing.memo));
        groups.entry(key).or_default().push(outgoing);
    }

    let mut plan = DedupePlan::default();

    for group in groups.into_values() {
        if group.len() == 1 {
            plan.kept.push(group[0].clone());
            continue;
        }

        // Canonical entry: highest amount; ties keep the first-inserted
        // (lowest id). Unique ids make the ordering total.
        let Some(canonical) = group.iter().copied().max_by(|a, b| {
            a.amount
                .partial_cmp(&b.amount)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.id.cmp(&a.id))
        }) else {
            continue;
        };

        for outgoing in group {
            if outgoing.id == canonical.id {
                plan.kept.push(outgoing.clone());
            } else {
                plan.removed.push(RemovedOutgoing {
                    id: outgoing.id,
                    merchant: outgoing.merchant.clone(),
                    amount: outgoing.amount,
                    day_of_month: outgoing.day_of_month,
                    reason: if outgoing.amount == canonical.amount {
                        "exact duplicate".to_string()
                    } else {
                        "cheaper duplicate".to_string()
                    },
                });
            }
        }
    }

    plan
}
