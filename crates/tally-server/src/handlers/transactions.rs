//! Raw transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{AppError, AppState, SuccessResponse, MAX_PAGE_LIMIT};
use tally_core::db::StatementMonth;
use tally_core::models::RawTransaction;

/// Query params for listing transactions
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    pub limit: Option<i64>,
}

fn clamp_limit(limit: Option<i64>) -> Option<i64> {
    limit.map(|l| l.clamp(1, MAX_PAGE_LIMIT))
}

/// GET /api/transactions - List stored raw transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<RawTransaction>>, AppError> {
    let transactions = state.db.list_raw_transactions(clamp_limit(query.limit))?;
    Ok(Json(transactions))
}

/// GET /api/transactions/months - Year-months with stored data, newest first
pub async fn available_months(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StatementMonth>>, AppError> {
    Ok(Json(state.db.available_months()?))
}

/// GET /api/transactions/month/:year/:month - Transactions for one month
pub async fn transactions_by_month(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<Vec<RawTransaction>>, AppError> {
    let transactions = state.db.raw_transactions_by_month(year, month)?;
    Ok(Json(transactions))
}

/// Query params for a date-range lookup (inclusive, ISO dates)
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start: String,
    pub end: String,
}

/// GET /api/transactions/range?start=YYYY-MM-DD&end=YYYY-MM-DD
pub async fn transactions_by_range(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<RawTransaction>>, AppError> {
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AppError::bad_request("Invalid date format. Use YYYY-MM-DD format."))
    };
    let start = parse(&query.start)?;
    let end = parse(&query.end)?;

    let transactions = state.db.raw_transactions_by_date_range(start, end)?;
    Ok(Json(transactions))
}

/// Request body for updating a transaction's category override
#[derive(Debug, Deserialize)]
pub struct OverrideRequest {
    /// New override; null or empty clears it, restoring the bank's label
    pub override_subcategory: Option<String>,
}

/// PATCH /api/transactions/:id/override - Set or clear the user override
///
/// The classifier reads the override on every pass, so this re-routes the
/// transaction between categories without touching the original record.
pub async fn override_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<OverrideRequest>,
) -> Result<Json<RawTransaction>, AppError> {
    let override_subcategory = request
        .override_subcategory
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let updated = state.db.set_override_subcategory(id, override_subcategory)?;
    Ok(Json(updated))
}

/// DELETE /api/transactions - Clear all stored data
pub async fn clear_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.clear_all_data()?;
    Ok(Json(SuccessResponse { success: true }))
}
