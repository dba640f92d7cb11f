//! Monthly affordability projection
//!
//! Composes the categorized sets into a forward-looking summary: observed
//! totals for the period, the projected net, and the next expected pay day
//! inferred from the largest income transaction (the anchor).

use chrono::{Months, NaiveDate};
use tracing::debug;

use crate::models::{CategorizedTransaction, MonthlyProjection};

/// Build a monthly projection from the categorized sets.
///
/// `today` is passed explicitly so the projection stays a pure function;
/// callers pass the current date. Totals are straight sums over the full
/// sets — observed cash flow for the period, not the recurring subset.
/// With no income at all the result is all zeroes with no next pay date,
/// which is a valid terminal state rather than an error.
pub fn project_monthly(
    income: &[CategorizedTransaction],
    outgoings: &[CategorizedTransaction],
    purchases: &[CategorizedTransaction],
    today: NaiveDate,
) -> MonthlyProjection {
    // Anchor: the single largest income transaction; first in input order
    // wins ties (strict > during the scan).
    let mut anchor: Option<&CategorizedTransaction> = None;
    for tx in income {
        let larger = anchor.map_or(true, |a| tx.amount > a.amount);
        if larger {
            anchor = Some(tx);
        }
    }

    let Some(anchor) = anchor else {
        return MonthlyProjection::zero();
    };

    let total_monthly_income: f64 = income.iter().map(|t| t.amount).sum();
    let total_monthly_outgoings: f64 = outgoings.iter().map(|t| t.amount).sum();
    let total_monthly_purchases: f64 = purchases.iter().map(|t| t.amount).sum();

    let projected_balance =
        total_monthly_income - (total_monthly_outgoings + total_monthly_purchases);

    let next_income_date = next_occurrence(anchor.date, today);

    debug!(
        anchor_amount = anchor.amount,
        ?next_income_date,
        projected_balance,
        "Computed monthly projection"
    );

    MonthlyProjection {
        next_income_date,
        total_monthly_income,
        total_monthly_outgoings,
        total_monthly_purchases,
        projected_balance,
        savings_per_month: projected_balance,
    }
}

/// Advance `anchor` by whole calendar months until strictly after `today`.
///
/// Each candidate is computed from the original anchor date, so the
/// day-of-month survives intermediate short months (Jan 31 projects to
/// Feb 28/29, then Mar 31). Returns None only if month arithmetic overflows
/// the calendar range.
fn next_occurrence(anchor: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let mut candidate = anchor;
    let mut months = 0u32;

    while candidate <= today {
        months += 1;
        candidate = anchor.checked_add_months(Months::new(months))?;
    }

    Some(candidate)
}
