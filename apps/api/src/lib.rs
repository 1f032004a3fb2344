//! # Ventas API
//!
//! HTTP server for the sales backend: CRUD over customers, products, sales
//! and line items, plus two ranking reports.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Ventas API                                      │
//! │                                                                         │
//! │  Request ──► TraceLayer ──► Router ──► Extractors (ApiJson, ApiPath)   │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                                   Handler (routes/*.rs)                 │
//! │                                   ├── validate()   (ventas-core)       │
//! │                                   └── repository   (ventas-db)         │
//! │                                              │                          │
//! │  Response ◄── JSON / ApiError { code, message } ◄┘                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables, see [`config::ApiConfig`]:
//! - `VENTAS_HOST`, `VENTAS_PORT` - listener
//! - `DATABASE_PATH`, `DB_MAX_CONNECTIONS` - SQLite store
//! - `DEFAULT_PAGE_LIMIT`, `MAX_PAGE_LIMIT` - pagination
//! - `RUST_LOG` - log filter

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::router;
pub use state::AppState;
