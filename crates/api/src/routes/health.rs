use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database does not answer
    pub status: String,
    /// Database reachability; absent when the service runs without one
    pub database: Option<bool>,
    pub timestamp: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.database() {
        Some(database) => Some(match database.test_connection().await {
            Ok(()) => true,
            Err(error) => {
                warn!(error = ?error, "database health check failed");
                false
            }
        }),
        None => None,
    };

    let status = if database == Some(false) { "degraded" } else { "ok" };

    Json(HealthResponse {
        status: status.to_string(),
        database,
        timestamp: Utc::now().to_rfc3339(),
    })
}
