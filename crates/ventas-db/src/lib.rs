//! # ventas-db: Database Layer for Ventas
//!
//! Record store, sale-total maintenance and ranking reports over SQLite,
//! using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ventas Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (ventas-api)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     ventas-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ CustomerRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo    │    │ 001_initial  │  │   │
//! │  │   │ WAL, FKs on   │    │ SaleRepo       │    │   _schema    │  │   │
//! │  │   │               │    │ LineItemRepo   │    │              │  │   │
//! │  │   │               │    │ ReportRepo     │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (ventas.db)                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`pool`] - Connection pool and `Database` handle
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ventas_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./ventas.db")).await?;
//!
//! let sale = db.sales().create(&new_sale).await?;
//! let top = db.reports().top_products(ReportQuery::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::customer::CustomerRepository;
pub use repository::line_item::LineItemRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
