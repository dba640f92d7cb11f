//! Scheduled outgoing handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState, SuccessResponse, MAX_PAGE_LIMIT};
use tally_core::db::ScheduledOutgoingUpdate;
use tally_core::models::{DedupeReport, NewScheduledOutgoing, ScheduledOutgoing};

/// Query params for listing scheduled outgoings
#[derive(Debug, Deserialize)]
pub struct ListOutgoingsQuery {
    /// Filter by merchant name (substring match)
    pub merchant: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/outgoings - List scheduled outgoings
pub async fn list_outgoings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListOutgoingsQuery>,
) -> Result<Json<Vec<ScheduledOutgoing>>, AppError> {
    let limit = query.limit.map(|l| l.clamp(1, MAX_PAGE_LIMIT));
    let outgoings = state
        .db
        .list_scheduled_outgoings(query.merchant.as_deref(), limit)?;
    Ok(Json(outgoings))
}

/// POST /api/outgoings - Create a scheduled outgoing
pub async fn create_outgoing(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewScheduledOutgoing>,
) -> Result<Json<ScheduledOutgoing>, AppError> {
    let outgoing = state.db.insert_scheduled_outgoing(&request)?;
    Ok(Json(outgoing))
}

/// POST /api/outgoings/from-transaction/:id - Track an observed transaction
/// as a scheduled outgoing (day-of-month taken from its date)
pub async fn outgoing_from_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ScheduledOutgoing>, AppError> {
    let tx = state
        .db
        .get_raw_transaction(id)?
        .ok_or_else(|| AppError::not_found(&format!("Transaction {} not found", id)))?;

    let outgoing = state
        .db
        .insert_scheduled_outgoing(&NewScheduledOutgoing::from_transaction(&tx))?;
    Ok(Json(outgoing))
}

/// PATCH /api/outgoings/:id - Update a scheduled outgoing
pub async fn update_outgoing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<ScheduledOutgoingUpdate>,
) -> Result<Json<ScheduledOutgoing>, AppError> {
    let outgoing = state.db.update_scheduled_outgoing(id, &update)?;
    Ok(Json(outgoing))
}

/// DELETE /api/outgoings/:id - Delete a scheduled outgoing
pub async fn delete_outgoing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete_scheduled_outgoing(id)? {
        return Err(AppError::not_found(&format!(
            "Scheduled outgoing {} not found",
            id
        )));
    }
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/outgoings/deduplicate - Remove duplicate scheduled outgoings
///
/// Groups by normalized (merchant, memo) and keeps one canonical entry per
/// group. The removal batch is applied all-or-nothing.
pub async fn deduplicate_outgoings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DedupeReport>, AppError> {
    let report = state.db.remove_duplicate_outgoings()?;
    Ok(Json(report))
}
