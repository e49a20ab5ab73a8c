//! Customer directory search.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext};
use crate::models::Customer;

#[derive(Deserialize)]
pub struct CustomerQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct CustomersResponse {
    pub ok: bool,
    pub count: usize,
    pub customers: Vec<Customer>,
}

/// `GET /customers?q=`: customers whose name contains `q`.
pub async fn search(
    State(ctx): State<ApiContext>,
    Query(params): Query<CustomerQuery>,
) -> Result<Json<CustomersResponse>, ApiError> {
    let erp = ctx.erp()?;
    let query = params.q.trim().to_string();
    let customers =
        run_blocking(move || erp.search_customers(&query).map_err(ApiError::from)).await?;

    Ok(Json(CustomersResponse {
        ok: true,
        count: customers.len(),
        customers,
    }))
}
