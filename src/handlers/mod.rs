//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the Providers API.

pub mod providers;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use crate::db;
use crate::error::ApiError;
use crate::models::ServiceInfo;
use crate::server::AppState;

/// Health handler that verifies database connectivity and returns basic
/// service information
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo),
        (status = 503, description = "Database unreachable", body = ApiError)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<ServiceInfo>, ApiError> {
    if let Err(err) = db::health_check(&state.db).await {
        tracing::error!(error = ?err, "Health check failed");
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Database service unavailable",
        ));
    }

    Ok(Json(ServiceInfo::default()))
}

#[cfg(test)]
mod tests;
