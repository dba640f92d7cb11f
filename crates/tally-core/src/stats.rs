//! Statement statistics
//!
//! Totals and per-month averages over the categorized sets, used by the
//! stats endpoint and as context for AI summaries.

use serde::Serialize;

use crate::models::CategorizedSet;

/// Spending and income statistics for a statement period
#[derive(Debug, Clone, Serialize)]
pub struct StatementStats {
    pub num_months: usize,
    pub total_income: f64,
    pub total_outgoings: f64,
    pub total_purchases: f64,
    /// Outgoings plus purchases
    pub total_spent: f64,
    /// Income minus total spent
    pub net_position: f64,
    pub avg_monthly_income: f64,
    pub avg_monthly_outgoings: f64,
    pub avg_monthly_purchases: f64,
    pub avg_monthly_spent: f64,
    pub num_income_transactions: usize,
    pub num_outgoing_transactions: usize,
    pub num_purchase_transactions: usize,
}

/// Compute statistics over a categorized set covering `num_months` of data
pub fn compute_stats(set: &CategorizedSet, num_months: usize) -> StatementStats {
    let total_income: f64 = set.income.iter().map(|t| t.amount).sum();
    let total_outgoings: f64 = set.outgoings.iter().map(|t| t.amount).sum();
    let total_purchases: f64 = set.purchases.iter().map(|t| t.amount).sum();
    let total_spent = total_outgoings + total_purchases;

    let per_month = |total: f64| {
        if num_months > 0 {
            total / num_months as f64
        } else {
            0.0
        }
    };

    StatementStats {
        num_months,
        total_income,
        total_outgoings,
        total_purchases,
        total_spent,
        net_position: total_income - total_spent,
        avg_monthly_income: per_month(total_income),
        avg_monthly_outgoings: per_month(total_outgoings),
        avg_monthly_purchases: per_month(total_purchases),
        avg_monthly_spent: per_month(total_spent),
        num_income_transactions: set.income.len(),
        num_outgoing_transactions: set.outgoings.len(),
        num_purchase_transactions: set.purchases.len(),
    }
}
