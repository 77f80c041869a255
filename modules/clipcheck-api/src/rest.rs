use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use tracing::warn;

use clipcheck_common::{CheckError, FactCheckResult, RawVideoRecord};

use crate::AppState;

#[derive(Deserialize)]
pub struct CheckRequest {
    pub url: String,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "clipcheck"
    }))
}

pub async fn check(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<FactCheckResult>, ApiError> {
    let result = state.pipeline.check(&req.url).await?;
    Ok(Json(result))
}

pub async fn scrape_metadata(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<RawVideoRecord>, ApiError> {
    let record = state.pipeline.scrape_only(&req.url).await?;
    Ok(Json(record))
}

pub async fn fact_check(
    State(state): State<Arc<AppState>>,
    Json(record): Json<RawVideoRecord>,
) -> Result<Json<FactCheckResult>, ApiError> {
    let result = state.pipeline.analyze_only(&record).await?;
    Ok(Json(result))
}

// --- Error mapping ---

pub struct ApiError(CheckError);

impl From<CheckError> for ApiError {
    fn from(err: CheckError) -> Self {
        ApiError(err)
    }
}

pub(crate) fn error_status(err: &CheckError) -> StatusCode {
    match err {
        CheckError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
        // Misconfigured server keys are our fault, not the caller's.
        CheckError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CheckError::CreditsExhausted(_) | CheckError::QuotaExceeded(_) => {
            StatusCode::PAYMENT_REQUIRED
        }
        CheckError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        CheckError::NotFound(_) => StatusCode::NOT_FOUND,
        CheckError::SchemaValidation(_) | CheckError::Upstream(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        CheckError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = error_status(&self.0);
        if status.is_server_error() {
            warn!(error = %self.0, "Request failed");
        }
        let body = Json(serde_json::json!({ "detail": self.0.to_string() }));
        (status, body).into_response()
    }
}
