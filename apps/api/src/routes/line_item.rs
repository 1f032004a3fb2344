//! # Line Item Handlers
//!
//! `/detalles` routes plus `GET /ventas/{id}/detalles`.
//!
//! Every mutation here recomputes the owning sale's total before the
//! response is sent; a follow-up `GET /ventas/{id}` always sees it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::ListParams;
use crate::state::AppState;
use ventas_core::{LineItem, LineItemUpdate, NewStandaloneLineItem};

/// `POST /detalles`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewStandaloneLineItem>,
) -> ApiResult<(StatusCode, Json<LineItem>)> {
    input.validate()?;

    let item = state.db.line_items().create(&input).await?;

    info!(id = item.id, venta_id = item.venta_id, "Line item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /detalles?skip&limit`
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Vec<LineItem>>> {
    let items = state
        .db
        .line_items()
        .list(params.page(&state.config))
        .await?;

    Ok(Json(items))
}

/// `GET /ventas/{id}/detalles`
pub async fn list_by_sale(
    State(state): State<AppState>,
    ApiPath(venta_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<LineItem>>> {
    let items = state.db.line_items().list_by_sale(venta_id).await?;
    Ok(Json(items))
}

/// `GET /detalles/{id}`
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<LineItem>> {
    state
        .db
        .line_items()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("LineItem", id))
}

/// `PUT|PATCH /detalles/{id}`
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(changes): ApiJson<LineItemUpdate>,
) -> ApiResult<Json<LineItem>> {
    changes.validate()?;

    let item = state.db.line_items().update(id, &changes).await?;
    Ok(Json(item))
}

/// `DELETE /detalles/{id}`
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    if !state.db.line_items().delete(id).await? {
        return Err(ApiError::not_found("LineItem", id));
    }

    info!(id, "Line item deleted");
    Ok(StatusCode::NO_CONTENT)
}
