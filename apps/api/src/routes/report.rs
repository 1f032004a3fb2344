//! # Report Handlers
//!
//! Read-only rankings. Default `limit` is 10.

use axum::extract::State;
use axum::Json;

use crate::error::ApiResult;
use crate::extract::ApiQuery;
use crate::routes::ReportParams;
use crate::state::AppState;
use ventas_core::{TopCustomer, TopProduct};

/// `GET /reportes/productos-mas-vendidos?limit`
pub async fn top_products(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ReportParams>,
) -> ApiResult<Json<Vec<TopProduct>>> {
    let rows = state
        .db
        .reports()
        .top_products(params.query(&state.config))
        .await?;

    Ok(Json(rows))
}

/// `GET /reportes/clientes-mas-ventas?limit`
pub async fn top_customers(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ReportParams>,
) -> ApiResult<Json<Vec<TopCustomer>>> {
    let rows = state
        .db
        .reports()
        .top_customers(params.query(&state.config))
        .await?;

    Ok(Json(rows))
}
