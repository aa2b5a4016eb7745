use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;
use tracing::error;

use crate::db::Database;

pub fn router(db: Database) -> Router {
    Router::new().route("/", get(health)).with_state(db)
}

#[derive(Serialize)]
struct HealthResponse {
    status: u16,
    message: &'static str,
}

async fn health(State(db): State<Database>) -> impl IntoResponse {
    let (status, message) = match db.ping().await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (
        status,
        Json(HealthResponse {
            status: status.as_u16(),
            message,
        }),
    )
}
