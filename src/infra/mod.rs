use axum::{extract::State, http::StatusCode, response::IntoResponse, routing, Json, Router};
use serde_json::json;

use crate::services::{manager::Connection, ping};

pub fn router(connection: Connection) -> Router {
    Router::new()
        .route("/health", routing::get(health_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .fallback(fallback_handler)
        .with_state(connection)
}

/// Liveness of the database plus the startup steps that didn't complete.
pub async fn health_handler(State(connection): State<Connection>) -> impl IntoResponse {
    let warnings = connection.warnings();

    match ping(connection.client()).await {
        Ok(()) => {
            let body = json!({
                "status": "ok",
                "database": connection.database_name(),
                "warnings": warnings,
            });

            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            tracing::error!("Health check failed | {e}");

            let body = json!({
                "status": "unavailable",
                "error": e.to_string(),
                "warnings": warnings,
            });

            (StatusCode::SERVICE_UNAVAILABLE, Json(body))
        }
    }
}

pub async fn fallback_handler() -> (StatusCode, &'static str) {
    NOT_FOUND_RESPONSE
}

const NOT_FOUND_RESPONSE: (StatusCode, &str) =
    (StatusCode::NOT_FOUND, "this resource doesn't exist");
