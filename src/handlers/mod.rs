pub mod categories;
pub mod expenses;
pub mod summary;

use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{delete, get, post};
use axum::Router;
use serde_json::json;

use crate::auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Account lifecycle
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        // Reference data
        .route("/api/categories", get(categories::list))
        // Expense CRUD
        .route("/api/expenses", get(expenses::list))
        .route("/api/expenses", post(expenses::create))
        .route("/api/expenses/:id", delete(expenses::remove))
        // Dashboard summary (JSON for charts)
        .route("/api/summary", get(summary::show))
        // Health check
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}

/// Unknown routes get the same JSON error shape as everything else.
pub async fn fallback() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Endpoint not found"})),
    )
}
