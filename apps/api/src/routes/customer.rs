//! # Customer Handlers
//!
//! `/clientes` collection and item routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::ListParams;
use crate::state::AppState;
use ventas_core::{Customer, CustomerUpdate, NewCustomer};

/// `POST /clientes`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    input.validate()?;

    let customer = state.db.customers().create(&input).await?;

    info!(id = customer.id, "Customer created");
    Ok((StatusCode::CREATED, Json(customer)))
}

/// `GET /clientes?skip&limit`
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Vec<Customer>>> {
    let customers = state
        .db
        .customers()
        .list(params.page(&state.config))
        .await?;

    Ok(Json(customers))
}

/// `GET /clientes/{id}`
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Customer>> {
    state
        .db
        .customers()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Customer", id))
}

/// `PUT|PATCH /clientes/{id}`
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(changes): ApiJson<CustomerUpdate>,
) -> ApiResult<Json<Customer>> {
    changes.validate()?;

    let customer = state.db.customers().update(id, &changes).await?;
    Ok(Json(customer))
}

/// `DELETE /clientes/{id}`. Cascades to the customer's sales.
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    if !state.db.customers().delete(id).await? {
        return Err(ApiError::not_found("Customer", id));
    }

    info!(id, "Customer deleted");
    Ok(StatusCode::NO_CONTENT)
}
