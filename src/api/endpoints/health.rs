//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub assistant_configured: bool,
    pub erp_configured: bool,
    pub corrections: usize,
}

/// `GET /`: liveness plus which integrations are configured.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: crate::config::SERVICE_NAME,
        version: crate::config::APP_VERSION,
        assistant_configured: ctx.extractor.has_assistant(),
        erp_configured: ctx.erp.is_some(),
        corrections: ctx.memory().len(),
    })
}
