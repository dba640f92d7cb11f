//! Statement upload handler

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};
use tally_core::classify::categorize_new;
use tally_core::ingest::parse_statement_csv;
use tally_core::models::NewRawTransaction;
use tally_core::recurring::find_consistent;

/// Result of processing one or more statement uploads
#[derive(Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub message: String,
    /// Raw transactions stored (after duplicate skipping)
    pub raw_imported: usize,
    /// Rows skipped because an identical row was already stored
    pub duplicates_skipped: usize,
    pub income_count: usize,
    pub outgoing_count: usize,
    pub purchase_count: usize,
    pub unclassified_count: usize,
    pub is_multi_month: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_months: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_outgoings: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_income: Option<usize>,
}

/// POST /api/import - Upload one or more statement CSV files
///
/// Each `file` field is parsed as a Barclays-style export. With more than one
/// file, each is treated as one month and the response additionally reports
/// the transactions that stay consistent across months.
pub async fn import_statement(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .unwrap_or("statement.csv")
            .to_string();

        if !filename.to_lowercase().ends_with(".csv") {
            return Err(AppError::bad_request(&format!(
                "Only CSV files are supported. Invalid file: {}",
                filename
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(&format!("Failed to read upload: {}", e)))?;

        if data.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::bad_request("File too large (max 10 MB)"));
        }

        files.push((filename, data.to_vec()));
    }

    if files.is_empty() {
        return Err(AppError::bad_request("No CSV file provided"));
    }

    let num_months = files.len();
    let mut batch: Vec<NewRawTransaction> = Vec::new();
    for (filename, data) in &files {
        let parsed = parse_statement_csv(&data[..]).map_err(|e| {
            AppError::bad_request(&format!("Failed to parse {}: {}", filename, e))
        })?;
        batch.extend(parsed);
    }

    let (raw_imported, duplicates_skipped) = state.db.insert_raw_transactions(&batch)?;

    // Categorize the uploaded batch for the response counts
    let set = categorize_new(&batch);

    let (consistent_outgoings, consistent_income) = if num_months > 1 {
        (
            Some(find_consistent(&set.outgoings, num_months).len()),
            Some(find_consistent(&set.income, num_months).len()),
        )
    } else {
        (None, None)
    };

    info!(
        files = num_months,
        raw_imported, duplicates_skipped, "Processed statement upload"
    );

    Ok(Json(ImportResponse {
        success: true,
        message: format!("Successfully processed {} file(s)", num_months),
        raw_imported,
        duplicates_skipped,
        income_count: set.income.len(),
        outgoing_count: set.outgoings.len(),
        purchase_count: set.purchases.len(),
        unclassified_count: set.unclassified,
        is_multi_month: num_months > 1,
        num_months: (num_months > 1).then_some(num_months),
        consistent_outgoings,
        consistent_income,
    }))
}
