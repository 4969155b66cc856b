//! Health check handler

use axum::Json;
use serde::Serialize;

use crate::utils::{AppResponse, AppResult, ok};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /api/health
pub async fn health() -> AppResult<Json<AppResponse<HealthStatus>>> {
    Ok(ok(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
