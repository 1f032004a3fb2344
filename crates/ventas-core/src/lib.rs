//! # ventas-core: Pure Business Logic for Ventas
//!
//! Domain types, the sale-total formula and input validation, with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Ventas Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (apps/api)                          │   │
//! │  │   /clientes  /productos  /ventas  /detalles  /reportes          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ventas-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  totals   │  │ validation│  │   │
//! │  │   │  Cliente  │  │   Money   │  │ sale_total│  │   rules   │  │   │
//! │  │   │   Venta   │  │           │  │ subtotal  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  ventas-db (Database Layer)                     │   │
//! │  │      SQLite queries, migrations, recomputation, reports         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities, create/update inputs and report rows
//! - [`money`] - Integer money type (no floating point)
//! - [`totals`] - The `(precio - descuento) * cantidad` formula
//! - [`validation`] - Input validation run before anything reaches the store
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use ventas_core::totals::sale_total;
//! use ventas_core::NewLineItem;
//!
//! let items = vec![NewLineItem {
//!     producto_id: 1,
//!     precio: 100,
//!     descuento: 10,
//!     cantidad: 2,
//! }];
//!
//! assert_eq!(sale_total(&items).unwrap().units(), 180);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used when a list request does not name one.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Row cap used when a ranking report does not name one.
pub const DEFAULT_REPORT_LIMIT: u32 = 10;

/// Maximum length accepted for names (customer and product).
pub const MAX_NAME_LEN: usize = 200;
