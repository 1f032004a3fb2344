//! # HTTP Routes
//!
//! ```text
//! ┌──────────────────────────────────────┬──────────────────────────────────┐
//! │ Route                                │ Handler module                   │
//! ├──────────────────────────────────────┼──────────────────────────────────┤
//! │ GET  /health                         │ (this module)                    │
//! │ *    /clientes[/{id}]                │ customer                         │
//! │ *    /productos[/{id}]               │ product                          │
//! │ *    /ventas[/{id}]                  │ sale                             │
//! │ GET  /ventas/{id}/detalles           │ line_item                        │
//! │ *    /detalles[/{id}]                │ line_item                        │
//! │ GET  /reportes/productos-mas-vendidos│ report                           │
//! │ GET  /reportes/clientes-mas-ventas   │ report                           │
//! └──────────────────────────────────────┴──────────────────────────────────┘
//! ```
//!
//! Collection routes take `GET` (list) and `POST` (create); item routes take
//! `GET`, `PUT`/`PATCH` (both partial updates) and `DELETE`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use ventas_core::{Page, ReportQuery, DEFAULT_REPORT_LIMIT};

use crate::config::ApiConfig;
use crate::state::AppState;

pub mod customer;
pub mod line_item;
pub mod product;
pub mod report;
pub mod sale;

/// Builds the application router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/clientes", get(customer::list).post(customer::create))
        .route(
            "/clientes/{id}",
            get(customer::get)
                .put(customer::update)
                .patch(customer::update)
                .delete(customer::delete),
        )
        .route("/productos", get(product::list).post(product::create))
        .route(
            "/productos/{id}",
            get(product::get)
                .put(product::update)
                .patch(product::update)
                .delete(product::delete),
        )
        .route("/ventas", get(sale::list).post(sale::create))
        .route(
            "/ventas/{id}",
            get(sale::get)
                .put(sale::update)
                .patch(sale::update)
                .delete(sale::delete),
        )
        .route("/ventas/{id}/detalles", get(line_item::list_by_sale))
        .route("/detalles", get(line_item::list).post(line_item::create))
        .route(
            "/detalles/{id}",
            get(line_item::get)
                .put(line_item::update)
                .patch(line_item::update)
                .delete(line_item::delete),
        )
        .route("/reportes/productos-mas-vendidos", get(report::top_products))
        .route("/reportes/clientes-mas-ventas", get(report::top_customers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")
    }
}

// =============================================================================
// Query Parameters
// =============================================================================

/// `?skip=&limit=` on list routes.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl ListParams {
    /// Resolves defaults and caps the limit.
    pub fn page(&self, config: &ApiConfig) -> Page {
        Page::new(
            self.skip.unwrap_or(0),
            self.limit.unwrap_or(config.default_page_limit),
        )
        .clamped(config.max_page_limit)
    }
}

/// `?limit=` on report routes.
#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub limit: Option<u32>,
}

impl ReportParams {
    pub fn query(&self, config: &ApiConfig) -> ReportQuery {
        ReportQuery {
            limit: self
                .limit
                .unwrap_or(DEFAULT_REPORT_LIMIT)
                .min(config.max_page_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_defaults_and_cap() {
        let config = ApiConfig::default();

        assert_eq!(ListParams::default().page(&config), Page::new(0, 100));

        let params = ListParams {
            skip: Some(20),
            limit: Some(5_000),
        };
        assert_eq!(params.page(&config), Page::new(20, 1000));
    }

    #[test]
    fn test_report_params_default() {
        let config = ApiConfig::default();
        assert_eq!(ReportParams::default().query(&config).limit, 10);
        assert_eq!(ReportParams { limit: Some(3) }.query(&config).limit, 3);
    }
}
