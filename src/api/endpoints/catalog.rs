//! Product catalog endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext};
use crate::models::CatalogEntry;
use crate::pipeline::normalize_catalog;

#[derive(Serialize)]
pub struct CatalogResponse {
    pub ok: bool,
    pub count: usize,
    pub products: Vec<CatalogEntry>,
}

/// `GET /catalog`: normalized product list from the ERP.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<CatalogResponse>, ApiError> {
    let erp = ctx.erp()?;
    let rows = run_blocking(move || erp.fetch_catalog().map_err(ApiError::from)).await?;
    let products = normalize_catalog(&rows);

    Ok(Json(CatalogResponse {
        ok: true,
        count: products.len(),
        products,
    }))
}
