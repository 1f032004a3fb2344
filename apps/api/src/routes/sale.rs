//! # Sale Handlers
//!
//! `/ventas` collection and item routes.
//!
//! ## Create Flow
//! ```text
//! POST /ventas { cliente_id, fecha?, detalles: [...] }
//!      │
//!      ▼
//! NewSale::validate()        ← every line checked, total must fit in i64
//!      │
//!      ▼
//! db.sales().create()        ← header + lines + total in one transaction
//!      │
//!      ▼
//! 201 { id, uuid, fecha, total, cliente_id, ..., detalles: [...] }
//! ```
//!
//! Header updates never touch line items; those go through `/detalles`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::ListParams;
use crate::state::AppState;
use ventas_core::{NewSale, SaleDetail, SaleUpdate};

/// `POST /ventas`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewSale>,
) -> ApiResult<(StatusCode, Json<SaleDetail>)> {
    input.validate()?;

    let sale = state.db.sales().create(&input).await?;

    info!(
        id = sale.venta.id,
        cliente_id = sale.venta.cliente_id,
        total = %sale.venta.total(),
        "Sale created"
    );
    Ok((StatusCode::CREATED, Json(sale)))
}

/// `GET /ventas?skip&limit`
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Vec<SaleDetail>>> {
    let sales = state.db.sales().list(params.page(&state.config)).await?;
    Ok(Json(sales))
}

/// `GET /ventas/{id}`
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<SaleDetail>> {
    state
        .db
        .sales()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Sale", id))
}

/// `PUT|PATCH /ventas/{id}`
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(changes): ApiJson<SaleUpdate>,
) -> ApiResult<Json<SaleDetail>> {
    changes.validate()?;

    let sale = state.db.sales().update(id, &changes).await?;
    Ok(Json(sale))
}

/// `DELETE /ventas/{id}`. Cascades to the sale's line items.
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    if !state.db.sales().delete(id).await? {
        return Err(ApiError::not_found("Sale", id));
    }

    info!(id, "Sale deleted");
    Ok(StatusCode::NO_CONTENT)
}
