//! # Repository Module
//!
//! Database repository implementations for Ventas.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                          │
//! │       │  db.line_items().create(&item)                                 │
//! │       ▼                                                                 │
//! │  LineItemRepository                                                    │
//! │  ├── BEGIN                                                             │
//! │  ├── INSERT INTO detalles_ventas ... RETURNING ...                     │
//! │  ├── sale::recompute_total(venta_id)   ← same transaction              │
//! │  └── COMMIT   (any `?` before this drops the tx → ROLLBACK)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! - `get_by_id` → `Ok(None)` when absent
//! - `update` → `Err(DbError::NotFound)` when absent
//! - `delete` → `Ok(false)` when absent
//! - `list` orders by internal id ascending
//!
//! ## Available Repositories
//! - [`CustomerRepository`](customer::CustomerRepository)
//! - [`ProductRepository`](product::ProductRepository)
//! - [`SaleRepository`](sale::SaleRepository)
//! - [`LineItemRepository`](line_item::LineItemRepository)
//! - [`ReportRepository`](report::ReportRepository)

use uuid::Uuid;
use ventas_core::Page;

pub mod customer;
pub mod line_item;
pub mod product;
pub mod report;
pub mod sale;

/// Generates a fresh external identifier.
pub(crate) fn new_external_id() -> String {
    Uuid::new_v4().to_string()
}

/// `(LIMIT, OFFSET)` bind values for a page.
pub(crate) fn page_bounds(page: Page) -> (i64, i64) {
    (i64::from(page.limit), i64::from(page.skip))
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the repository tests.

    use crate::{Database, DbConfig};
    use ventas_core::{Customer, NewCustomer, NewProduct, Product};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn customer(db: &Database, n: u32) -> Customer {
        db.customers()
            .create(&NewCustomer {
                nombre: format!("Cliente {n}"),
                email: format!("cliente{n}@example.com"),
                rut: format!("1000{n}-{}", n % 10),
            })
            .await
            .unwrap()
    }

    pub async fn product(db: &Database, nombre: &str, precio: i64) -> Product {
        db.products()
            .create(&NewProduct {
                nombre: nombre.to_string(),
                categoria: Some("General".to_string()),
                precio,
            })
            .await
            .unwrap()
    }
}
