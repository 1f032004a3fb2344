//! # Report Repository
//!
//! Read-only ranking aggregates.
//!
//! ```text
//! productos-mas-vendidos              clientes-mas-ventas
//! ──────────────────────              ───────────────────
//! detalles_ventas ⋈ productos         ventas ⋈ clientes
//! GROUP BY producto                   GROUP BY cliente
//!   total_cantidad = Σ cantidad         total_ventas = COUNT(ventas)
//!   total_ingresos = Σ (p - d) * c      total_monto  = Σ total
//! ORDER BY total_cantidad DESC,       ORDER BY total_ventas DESC,
//!          producto id ASC                     cliente id ASC
//! LIMIT n                             LIMIT n
//! ```
//!
//! Products never sold and customers without sales do not appear.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use ventas_core::{ReportQuery, TopCustomer, TopProduct};

/// Repository for the ranking reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Products ranked by units sold.
    pub async fn top_products(&self, query: ReportQuery) -> DbResult<Vec<TopProduct>> {
        debug!(limit = query.limit, "Computing top products");

        let rows = sqlx::query_as::<_, TopProduct>(
            "SELECT
                p.id AS producto_id,
                p.nombre AS nombre,
                SUM(d.cantidad) AS total_cantidad,
                SUM((d.precio - d.descuento) * d.cantidad) AS total_ingresos
             FROM detalles_ventas d
             JOIN productos p ON p.id = d.producto_id
             GROUP BY p.id, p.nombre
             ORDER BY total_cantidad DESC, p.id ASC
             LIMIT ?",
        )
        .bind(i64::from(query.limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Customers ranked by number of sales.
    pub async fn top_customers(&self, query: ReportQuery) -> DbResult<Vec<TopCustomer>> {
        debug!(limit = query.limit, "Computing top customers");

        let rows = sqlx::query_as::<_, TopCustomer>(
            "SELECT
                c.id AS cliente_id,
                c.nombre AS nombre,
                COUNT(v.id) AS total_ventas,
                COALESCE(SUM(v.total), 0) AS total_monto
             FROM ventas v
             JOIN clientes c ON c.id = v.cliente_id
             GROUP BY c.id, c.nombre
             ORDER BY total_ventas DESC, c.id ASC
             LIMIT ?",
        )
        .bind(i64::from(query.limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
