//! Balance snapshot and overdraft limit handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{AppError, AppState, MAX_PAGE_LIMIT};
use tally_core::models::{BalanceSnapshot, OverdraftLimit};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

fn clamp_limit(limit: Option<i64>) -> Option<i64> {
    limit.map(|l| l.clamp(1, MAX_PAGE_LIMIT))
}

/// Request body for recording a balance snapshot
#[derive(Debug, Deserialize)]
pub struct BalanceRequest {
    pub name: String,
    pub amount: f64,
    /// Defaults to now
    pub recorded_at: Option<DateTime<Utc>>,
}

/// POST /api/balances - Record a balance snapshot
pub async fn create_balance(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BalanceRequest>,
) -> Result<Json<BalanceSnapshot>, AppError> {
    let snapshot =
        state
            .db
            .add_balance_snapshot(&request.name, request.amount, request.recorded_at)?;
    Ok(Json(snapshot))
}

/// GET /api/balances - List balance snapshots, most recent first
pub async fn list_balances(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<BalanceSnapshot>>, AppError> {
    Ok(Json(state.db.list_balance_snapshots(clamp_limit(query.limit))?))
}

/// GET /api/balances/latest - Most recent balance snapshot (null if none)
pub async fn latest_balance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<BalanceSnapshot>>, AppError> {
    Ok(Json(state.db.latest_balance_snapshot()?))
}

/// Request body for recording an overdraft limit
#[derive(Debug, Deserialize)]
pub struct OverdraftRequest {
    pub amount: f64,
    /// Defaults to now
    pub recorded_at: Option<DateTime<Utc>>,
}

/// POST /api/overdrafts - Record an overdraft limit
pub async fn create_overdraft(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OverdraftRequest>,
) -> Result<Json<OverdraftLimit>, AppError> {
    let limit = state
        .db
        .add_overdraft_limit(request.amount, request.recorded_at)?;
    Ok(Json(limit))
}

/// GET /api/overdrafts - List overdraft limits, most recent first
pub async fn list_overdrafts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<OverdraftLimit>>, AppError> {
    Ok(Json(state.db.list_overdraft_limits(clamp_limit(query.limit))?))
}

/// GET /api/overdrafts/latest - Most recent overdraft limit (null if none)
pub async fn latest_overdraft(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<OverdraftLimit>>, AppError> {
    Ok(Json(state.db.latest_overdraft_limit()?))
}
