//! Analysis handlers: categorized views, recurring groups, balance history,
//! projection, and statement statistics

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{AppError, AppState};
use tally_core::balance::reconstruct_balance;
use tally_core::classify::categorize;
use tally_core::models::{
    BalancePoint, CategorizedSet, CategorizedTransaction, MonthlyProjection, RecurringGroup,
};
use tally_core::projection::project_monthly;
use tally_core::recurring::detect_recurring;
use tally_core::stats::{compute_stats, StatementStats};

/// Fetch and classify everything currently stored
fn categorized_set(state: &AppState) -> Result<CategorizedSet, AppError> {
    let raw = state.db.list_raw_transactions(None)?;
    Ok(categorize(&raw))
}

/// GET /api/categorized/income - Income transactions
pub async fn categorized_income(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategorizedTransaction>>, AppError> {
    Ok(Json(categorized_set(&state)?.income))
}

/// GET /api/categorized/outgoings - Scheduled outgoing transactions
pub async fn categorized_outgoings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategorizedTransaction>>, AppError> {
    Ok(Json(categorized_set(&state)?.outgoings))
}

/// GET /api/categorized/purchases - Purchase transactions
pub async fn categorized_purchases(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategorizedTransaction>>, AppError> {
    Ok(Json(categorized_set(&state)?.purchases))
}

/// GET /api/recurring - Recurring groups over all categorized transactions
pub async fn recurring_groups(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RecurringGroup>>, AppError> {
    let set = categorized_set(&state)?;

    let mut all = set.income;
    all.extend(set.outgoings);
    all.extend(set.purchases);

    Ok(Json(detect_recurring(&all)))
}

/// Query params for balance reconstruction
#[derive(Debug, Deserialize)]
pub struct BalanceHistoryQuery {
    /// Overrides the latest recorded balance snapshot
    pub starting_balance: Option<f64>,
}

/// GET /api/balance/history - Reconstructed running-balance series
///
/// The starting balance comes from the query parameter, else the latest
/// recorded snapshot, else zero.
pub async fn balance_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BalanceHistoryQuery>,
) -> Result<Json<Vec<BalancePoint>>, AppError> {
    let starting_balance = match query.starting_balance {
        Some(balance) => balance,
        None => state
            .db
            .latest_balance_snapshot()?
            .map(|s| s.amount)
            .unwrap_or(0.0),
    };

    let set = categorized_set(&state)?;
    let series = reconstruct_balance(&set.income, &set.outgoings, &set.purchases, starting_balance);

    Ok(Json(series))
}

/// GET /api/projection - Monthly affordability projection
pub async fn monthly_projection(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MonthlyProjection>, AppError> {
    let set = categorized_set(&state)?;
    let today = Utc::now().date_naive();

    Ok(Json(project_monthly(
        &set.income,
        &set.outgoings,
        &set.purchases,
        today,
    )))
}

/// GET /api/stats - Statement statistics over everything stored
pub async fn statement_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatementStats>, AppError> {
    let set = categorized_set(&state)?;
    let num_months = state.db.available_months()?.len().max(1);

    Ok(Json(compute_stats(&set, num_months)))
}
