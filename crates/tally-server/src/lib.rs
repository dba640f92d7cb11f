//! Tally Web Server
//!
//! Axum-based REST API for the Tally bank-statement analysis tool.
//!
//! The server is thin plumbing: statement uploads and stored-data management
//! on one side, the tally-core analysis engine on the other. It holds no
//! state of its own beyond the database handle and the optional summary
//! backend client.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use tally_core::db::Database;
use tally_core::summary::SummaryClient;

mod handlers;

/// Maximum statement upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    /// Optional AI summary backend
    pub summary: Option<SummaryClient>,
}

/// Create the application router
pub fn create_router(db: Database, config: ServerConfig) -> Router {
    let summary = SummaryClient::from_env();
    match &summary {
        Some(client) => info!(
            "Summary backend configured: {} (model: {})",
            client.host(),
            client.model()
        ),
        None => info!("Summary backend not configured (set OLLAMA_HOST to enable AI summaries)"),
    }

    let state = Arc::new(AppState { db, summary });

    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::health))
        // Statement import
        .route("/import", post(handlers::import_statement))
        // Raw transactions
        .route(
            "/transactions",
            get(handlers::list_transactions).delete(handlers::clear_data),
        )
        .route("/transactions/months", get(handlers::available_months))
        .route("/transactions/range", get(handlers::transactions_by_range))
        .route(
            "/transactions/month/:year/:month",
            get(handlers::transactions_by_month),
        )
        .route(
            "/transactions/:id/override",
            patch(handlers::override_transaction),
        )
        // Categorized views
        .route("/categorized/income", get(handlers::categorized_income))
        .route(
            "/categorized/outgoings",
            get(handlers::categorized_outgoings),
        )
        .route(
            "/categorized/purchases",
            get(handlers::categorized_purchases),
        )
        // Analysis
        .route("/recurring", get(handlers::recurring_groups))
        .route("/balance/history", get(handlers::balance_history))
        .route("/projection", get(handlers::monthly_projection))
        .route("/stats", get(handlers::statement_stats))
        // Scheduled outgoings
        .route(
            "/outgoings",
            get(handlers::list_outgoings).post(handlers::create_outgoing),
        )
        .route(
            "/outgoings/deduplicate",
            post(handlers::deduplicate_outgoings),
        )
        .route(
            "/outgoings/from-transaction/:id",
            post(handlers::outgoing_from_transaction),
        )
        .route(
            "/outgoings/:id",
            patch(handlers::update_outgoing).delete(handlers::delete_outgoing),
        )
        // Balance snapshots
        .route(
            "/balances",
            get(handlers::list_balances).post(handlers::create_balance),
        )
        .route("/balances/latest", get(handlers::latest_balance))
        // Overdraft limits
        .route(
            "/overdrafts",
            get(handlers::list_overdrafts).post(handlers::create_overdraft),
        )
        .route("/overdrafts/latest", get(handlers::latest_overdraft))
        // AI summaries
        .route("/summary/spending", get(handlers::spending_summary))
        .route("/summary/income", get(handlers::income_summary))
        .route("/summary/purchases", get(handlers::purchases_summary))
        .route(
            "/summary/comprehensive",
            get(handlers::comprehensive_summary),
        );

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Start the server
pub async fn serve(db: Database, host: &str, port: u16, config: ServerConfig) -> anyhow::Result<()> {
    // Check summary backend connection
    if let Some(client) = SummaryClient::from_env() {
        if client.health_check().await {
            info!(
                "Summary backend connected: {} (model: {})",
                client.host(),
                client.model()
            );
        } else {
            tracing::warn!(
                "Summary backend configured but not responding: {}",
                client.host()
            );
        }
    }

    let app = create_router(db, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<tally_core::Error> for AppError {
    fn from(err: tally_core::Error) -> Self {
        use tally_core::Error as CoreError;

        let status = match &err {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::InvalidData(_) | CoreError::Ingest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Sanitize internal failures; surface caller mistakes as-is
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "An internal error occurred".to_string()
        } else {
            err.to_string()
        };

        Self {
            status,
            message,
            internal: Some(anyhow::Error::new(err)),
        }
    }
}

/// Generic success body
#[derive(serde::Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
