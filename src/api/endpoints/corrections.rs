//! Correction memory endpoints.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext};
use crate::models::Correction;
use crate::pipeline::RecordOutcome;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionRequest {
    pub original_text: String,
    pub corrected_code: String,
    #[serde(default)]
    pub corrected_name: String,
}

#[derive(Serialize)]
pub struct RecordResponse {
    pub ok: bool,
    pub status: RecordOutcome,
    pub count: usize,
}

#[derive(Serialize)]
pub struct CorrectionsResponse {
    pub ok: bool,
    pub count: usize,
    pub corrections: Vec<Correction>,
}

/// `POST /corrections`: remember how an operator fixed a line.
pub async fn record(
    State(ctx): State<ApiContext>,
    Json(payload): Json<CorrectionRequest>,
) -> Result<Json<RecordResponse>, ApiError> {
    if payload.original_text.trim().is_empty() {
        return Err(ApiError::BadRequest("originalText must not be empty".into()));
    }
    if payload.corrected_code.trim().is_empty() {
        return Err(ApiError::BadRequest("correctedCode must not be empty".into()));
    }

    let correction = Correction::new(
        &payload.original_text,
        payload.corrected_code.trim(),
        &payload.corrected_name,
    );
    let memory = ctx.memory().clone();
    let (status, count) = run_blocking(move || {
        let status = memory.record(correction);
        Ok((status, memory.len()))
    })
    .await?;

    Ok(Json(RecordResponse {
        ok: true,
        status,
        count,
    }))
}

/// `GET /corrections`: current memory contents, oldest first.
pub async fn list(State(ctx): State<ApiContext>) -> Json<CorrectionsResponse> {
    let corrections = ctx.memory().load();
    Json(CorrectionsResponse {
        ok: true,
        count: corrections.len(),
        corrections,
    })
}
