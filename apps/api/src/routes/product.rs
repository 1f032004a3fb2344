//! # Product Handlers
//!
//! `/productos` collection and item routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::ListParams;
use crate::state::AppState;
use ventas_core::{NewProduct, Product, ProductUpdate};
use ventas_db::DbError;

/// `POST /productos`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    input.validate()?;

    let product = state.db.products().create(&input).await?;

    info!(id = product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /productos?skip&limit`
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Vec<Product>>> {
    let products = state
        .db
        .products()
        .list(params.page(&state.config))
        .await?;

    Ok(Json(products))
}

/// `GET /productos/{id}`
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Product>> {
    state
        .db
        .products()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", id))
}

/// `PUT|PATCH /productos/{id}`. Existing line items keep their own price.
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(changes): ApiJson<ProductUpdate>,
) -> ApiResult<Json<Product>> {
    changes.validate()?;

    let product = state.db.products().update(id, &changes).await?;
    Ok(Json(product))
}

/// `DELETE /productos/{id}`. Refused while line items reference the product.
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    let existed = state.db.products().delete(id).await.map_err(|e| match e {
        DbError::ForeignKeyViolation { .. } => {
            ApiError::conflict(format!("Product {} is referenced by sale line items", id))
        }
        other => other.into(),
    })?;

    if !existed {
        return Err(ApiError::not_found("Product", id));
    }

    info!(id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
