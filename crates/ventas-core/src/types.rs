//! # Domain Types
//!
//! Core domain types used throughout Ventas.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   owns   ┌─────────────────┐   owns               │
//! │  │    Customer     │─────────►│      Sale       │──────────┐           │
//! │  │  (clientes)     │ cascade  │    (ventas)     │ cascade  │           │
//! │  │  email, rut     │          │  total (derived)│          ▼           │
//! │  └─────────────────┘          └─────────────────┘  ┌─────────────────┐ │
//! │                                                    │    LineItem     │ │
//! │  ┌─────────────────┐        references             │ (detalles_ventas│ │
//! │  │    Product      │◄──────────────────────────────│  precio, desc., │ │
//! │  │  (productos)    │        (restrict)             │  cantidad)      │ │
//! │  └─────────────────┘                               └─────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: INTEGER primary key, used for relations and routes
//! - `uuid`: UUID v4 external identifier, opaque and non-sequential
//!
//! ## Inputs
//! `New*` types are create payloads; `*Update` types are partial updates
//! where `None` means "leave the column untouched".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::{DEFAULT_PAGE_LIMIT, DEFAULT_REPORT_LIMIT};

// =============================================================================
// Customer
// =============================================================================

/// A customer that owns sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub uuid: String,
    pub nombre: String,
    /// Unique across customers.
    pub email: String,
    /// Tax id, unique across customers.
    pub rut: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub modified_at: DateTime<Utc>,
}

/// Create payload for a customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub nombre: String,
    pub email: String,
    pub rut: String,
}

/// Partial update for a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerUpdate {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub rut: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A product that can appear on line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub uuid: String,
    pub nombre: String,
    pub categoria: Option<String>,
    /// Current list price. Line items keep their own copy.
    pub precio: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub modified_at: DateTime<Utc>,
}

/// Create payload for a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub nombre: String,
    #[serde(default)]
    pub categoria: Option<String>,
    pub precio: i64,
}

/// Partial update for a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(default)]
    pub precio: Option<i64>,
}

// =============================================================================
// Sale
// =============================================================================

/// A sale header. `total` is derived from the line items and stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    pub uuid: String,
    /// Transaction date.
    #[ts(as = "String")]
    pub fecha: DateTime<Utc>,
    pub total: i64,
    pub cliente_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub modified_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the stored total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_units(self.total)
    }
}

/// A sale header together with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub venta: Sale,
    pub detalles: Vec<LineItem>,
}

/// Create payload for a sale, with its full batch of line items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub cliente_id: i64,
    /// Defaults to the creation instant.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub fecha: Option<DateTime<Utc>>,
    #[serde(default)]
    pub detalles: Vec<NewLineItem>,
}

/// Partial update for a sale header. Line items are not touched here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleUpdate {
    #[serde(default)]
    pub cliente_id: Option<i64>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub fecha: Option<DateTime<Utc>>,
}

// =============================================================================
// Line Item
// =============================================================================

/// One product entry within a sale.
///
/// `precio` is the price applied at sale time and is intentionally decoupled
/// from the product's current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LineItem {
    pub id: i64,
    pub uuid: String,
    pub venta_id: i64,
    pub producto_id: i64,
    pub precio: i64,
    /// Per-unit discount.
    pub descuento: i64,
    pub cantidad: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub modified_at: DateTime<Utc>,
}

fn default_cantidad() -> i64 {
    1
}

/// Line item nested in a sale create payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewLineItem {
    pub producto_id: i64,
    pub precio: i64,
    #[serde(default)]
    pub descuento: i64,
    #[serde(default = "default_cantidad")]
    pub cantidad: i64,
}

impl NewLineItem {
    /// Binds this line to the sale it is created with.
    pub fn for_sale(&self, venta_id: i64) -> NewStandaloneLineItem {
        NewStandaloneLineItem {
            venta_id,
            producto_id: self.producto_id,
            precio: self.precio,
            descuento: self.descuento,
            cantidad: self.cantidad,
        }
    }
}

/// Line item created on its own against an existing sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewStandaloneLineItem {
    pub venta_id: i64,
    pub producto_id: i64,
    pub precio: i64,
    #[serde(default)]
    pub descuento: i64,
    #[serde(default = "default_cantidad")]
    pub cantidad: i64,
}

/// Partial update for a line item. The sale and product links are fixed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemUpdate {
    #[serde(default)]
    pub precio: Option<i64>,
    #[serde(default)]
    pub descuento: Option<i64>,
    #[serde(default)]
    pub cantidad: Option<i64>,
}

// =============================================================================
// Reports
// =============================================================================

/// Row of the top-products-by-volume report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TopProduct {
    pub producto_id: i64,
    pub nombre: String,
    /// Sum of quantities sold.
    pub total_cantidad: i64,
    /// Sum of `(precio - descuento) * cantidad`.
    pub total_ingresos: i64,
}

/// Row of the top-customers-by-sale-count report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TopCustomer {
    pub cliente_id: i64,
    pub nombre: String,
    /// Number of sales.
    pub total_ventas: i64,
    /// Sum of the stored sale totals.
    pub total_monto: i64,
}

// =============================================================================
// Query Parameters
// =============================================================================

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

fn default_report_limit() -> u32 {
    DEFAULT_REPORT_LIMIT
}

/// Offset pagination. Lists are ordered by internal id ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Page {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_page_limit")]
    pub limit: u32,
}

impl Page {
    pub const fn new(skip: u32, limit: u32) -> Self {
        Page { skip, limit }
    }

    /// Returns a copy whose limit does not exceed `max_limit`.
    pub fn clamped(self, max_limit: u32) -> Self {
        Page {
            skip: self.skip,
            limit: self.limit.min(max_limit),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(0, DEFAULT_PAGE_LIMIT)
    }
}

/// Result-count cap for the ranking reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportQuery {
    #[serde(default = "default_report_limit")]
    pub limit: u32,
}

impl Default for ReportQuery {
    fn default() -> Self {
        ReportQuery {
            limit: DEFAULT_REPORT_LIMIT,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
