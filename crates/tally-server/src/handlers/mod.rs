//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analysis;
pub mod balances;
pub mod import;
pub mod outgoings;
pub mod summaries;
pub mod transactions;

// Re-export all handlers for use in router
pub use analysis::*;
pub use balances::*;
pub use import::*;
pub use outgoings::*;
pub use summaries::*;
pub use transactions::*;

use axum::Json;
use serde::Serialize;

/// GET /api/health - Health check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Tally API is running",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
}
