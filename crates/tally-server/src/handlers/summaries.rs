//! AI summary handlers
//!
//! Prose summaries over the categorized data, generated by the optional
//! summary backend. With no backend configured the endpoints return 503;
//! empty data returns a fixed message without touching the backend.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};
use tally_core::classify::categorize;
use tally_core::models::{CategorizedSet, CategorizedTransaction};
use tally_core::stats::{compute_stats, StatementStats};
use tally_core::summary::SummaryClient;

/// Response for AI-generated summaries
#[derive(Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub total_amount: f64,
    pub transaction_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<StatementStats>,
}

fn categorized_with_stats(state: &AppState) -> Result<(CategorizedSet, StatementStats), AppError> {
    let raw = state.db.list_raw_transactions(None)?;
    let set = categorize(&raw);
    let num_months = state.db.available_months()?.len().max(1);
    let stats = compute_stats(&set, num_months);
    Ok((set, stats))
}

fn require_client(state: &AppState) -> Result<&SummaryClient, AppError> {
    state.summary.as_ref().ok_or_else(|| {
        AppError::unavailable("Summary backend not configured. Set OLLAMA_HOST to enable AI summaries.")
    })
}

fn total(transactions: &[CategorizedTransaction]) -> f64 {
    transactions.iter().map(|t| t.amount).sum()
}

/// GET /api/summary/spending - Summary of regular bills and direct debits
pub async fn spending_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SummaryResponse>, AppError> {
    let (set, stats) = categorized_with_stats(&state)?;

    if set.outgoings.is_empty() {
        return Ok(Json(SummaryResponse {
            summary: "No spending data available.".to_string(),
            total_amount: 0.0,
            transaction_count: 0,
            statistics: None,
        }));
    }

    let client = require_client(&state)?;
    let summary = client.spending_summary(&set.outgoings, Some(&stats)).await?;

    Ok(Json(SummaryResponse {
        summary,
        total_amount: total(&set.outgoings),
        transaction_count: set.outgoings.len(),
        statistics: None,
    }))
}

/// GET /api/summary/income - Summary of income sources
pub async fn income_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SummaryResponse>, AppError> {
    let (set, stats) = categorized_with_stats(&state)?;

    if set.income.is_empty() {
        return Ok(Json(SummaryResponse {
            summary: "No income data available.".to_string(),
            total_amount: 0.0,
            transaction_count: 0,
            statistics: None,
        }));
    }

    let client = require_client(&state)?;
    let summary = client.income_summary(&set.income, Some(&stats)).await?;

    Ok(Json(SummaryResponse {
        summary,
        total_amount: total(&set.income),
        transaction_count: set.income.len(),
        statistics: None,
    }))
}

/// GET /api/summary/purchases - Summary of discretionary purchases
pub async fn purchases_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SummaryResponse>, AppError> {
    let (set, stats) = categorized_with_stats(&state)?;

    if set.purchases.is_empty() {
        return Ok(Json(SummaryResponse {
            summary: "No purchase data available.".to_string(),
            total_amount: 0.0,
            transaction_count: 0,
            statistics: None,
        }));
    }

    let client = require_client(&state)?;
    let summary = client.purchases_summary(&set.purchases, Some(&stats)).await?;

    Ok(Json(SummaryResponse {
        summary,
        total_amount: total(&set.purchases),
        transaction_count: set.purchases.len(),
        statistics: None,
    }))
}

/// GET /api/summary/comprehensive - Full financial-health summary
pub async fn comprehensive_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SummaryResponse>, AppError> {
    let (set, stats) = categorized_with_stats(&state)?;

    let transaction_count = set.income.len() + set.outgoings.len() + set.purchases.len();
    if transaction_count == 0 {
        return Ok(Json(SummaryResponse {
            summary: "No financial data available.".to_string(),
            total_amount: 0.0,
            transaction_count: 0,
            statistics: None,
        }));
    }

    let client = require_client(&state)?;
    let summary = client.comprehensive_summary(&stats).await?;

    Ok(Json(SummaryResponse {
        summary,
        total_amount: stats.total_spent,
        transaction_count,
        statistics: Some(stats),
    }))
}
