//! # Sale Repository
//!
//! Database operations for sale headers (`ventas`) and the rule that keeps
//! their stored totals consistent with their line items.
//!
//! ## Sale Total Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Total Lifecycle                              │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── total = Σ (precio - descuento) * cantidad over the batch       │
//! │         computed in Rust (ventas_core::totals), inserted with the      │
//! │         header and every line in ONE transaction                       │
//! │                                                                         │
//! │  2. LINE ITEM INSERT / UPDATE / DELETE                                 │
//! │     └── recompute_total(venta_id) runs in the SAME transaction         │
//! │         as the mutation, before commit                                 │
//! │                                                                         │
//! │  3. HEADER UPDATE (cliente_id, fecha)                                  │
//! │     └── total untouched                                                │
//! │                                                                         │
//! │  4. DELETE                                                             │
//! │     └── line items go with it (ON DELETE CASCADE)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::line_item;
use crate::repository::{new_external_id, page_bounds};
use ventas_core::totals::sale_total;
use ventas_core::{Money, NewSale, Page, Sale, SaleDetail, SaleUpdate};

const COLUMNS: &str = "id, uuid, fecha, total, cliente_id, created_at, modified_at";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Creates a sale header together with its batch of line items.
    ///
    /// ## What This Does
    /// 1. Computes the total from the submitted lines
    /// 2. Inserts the header (`fecha` defaults to now)
    /// 3. Inserts every line against the new sale id
    /// 4. Commits; any failure leaves nothing behind
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown customer or product
    /// * `Err(DbError::Domain)` - Total does not fit in an `i64`
    pub async fn create(&self, input: &NewSale) -> DbResult<SaleDetail> {
        let total = sale_total(&input.detalles)?;
        let now = Utc::now();

        debug!(
            cliente_id = input.cliente_id,
            items = input.detalles.len(),
            total = %total,
            "Creating sale"
        );

        let mut tx = self.pool.begin().await?;

        let venta = sqlx::query_as::<_, Sale>(&format!(
            "INSERT INTO ventas (uuid, fecha, total, cliente_id, created_at, modified_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        ))
        .bind(new_external_id())
        .bind(input.fecha.unwrap_or(now))
        .bind(total.units())
        .bind(input.cliente_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let mut detalles = Vec::with_capacity(input.detalles.len());
        for item in &input.detalles {
            let line = line_item::insert(&mut tx, &item.for_sale(venta.id), now).await?;
            detalles.push(line);
        }

        tx.commit().await?;

        debug!(id = venta.id, "Sale created");
        Ok(SaleDetail { venta, detalles })
    }

    /// Gets a sale header with its line items.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<SaleDetail>> {
        let Some(venta) = fetch_sale(&self.pool, id).await? else {
            return Ok(None);
        };

        let detalles = line_item::fetch_for_sale(&self.pool, id).await?;
        Ok(Some(SaleDetail { venta, detalles }))
    }

    /// Lists sales ordered by id, each with its line items.
    pub async fn list(&self, page: Page) -> DbResult<Vec<SaleDetail>> {
        let (limit, offset) = page_bounds(page);

        let ventas = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {COLUMNS} FROM ventas ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        // One query for the lines of exactly these headers
        let ids: Vec<i64> = ventas.iter().map(|v| v.id).collect();
        let mut by_sale = line_item::fetch_for_sales(&self.pool, &ids).await?;

        Ok(ventas
            .into_iter()
            .map(|venta| SaleDetail {
                detalles: by_sale.remove(&venta.id).unwrap_or_default(),
                venta,
            })
            .collect())
    }

    /// Updates header fields. Line items and the total are left alone.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No sale with this id
    /// * `Err(DbError::ForeignKeyViolation)` - New `cliente_id` doesn't exist
    pub async fn update(&self, id: i64, changes: &SaleUpdate) -> DbResult<SaleDetail> {
        debug!(id, "Updating sale");

        let mut tx = self.pool.begin().await?;

        let venta = sqlx::query_as::<_, Sale>(&format!(
            "UPDATE ventas SET
                cliente_id = COALESCE(?, cliente_id),
                fecha = COALESCE(?, fecha),
                modified_at = ?
             WHERE id = ?
             RETURNING {COLUMNS}"
        ))
        .bind(changes.cliente_id)
        .bind(changes.fecha)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Sale", id))?;

        let detalles = line_item::fetch_for_sale(&mut *tx, id).await?;

        tx.commit().await?;
        Ok(SaleDetail { venta, detalles })
    }

    /// Deletes a sale and its line items. Returns whether a sale existed.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id, "Deleting sale");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM ventas WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Counts sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ventas")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Fetches a bare sale header on any executor (pool or open transaction).
pub(crate) async fn fetch_sale<'e, E>(executor: E, id: i64) -> DbResult<Option<Sale>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let venta = sqlx::query_as::<_, Sale>(&format!("SELECT {COLUMNS} FROM ventas WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(venta)
}

/// Recomputes and stores a sale's total from its current line items.
///
/// Must run on the connection of the transaction that mutated the lines so
/// the new total commits (or rolls back) together with the mutation.
///
/// ```text
/// total = COALESCE(SUM((precio - descuento) * cantidad), 0)
/// ```
pub(crate) async fn recompute_total(conn: &mut SqliteConnection, venta_id: i64) -> DbResult<Money> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM((precio - descuento) * cantidad), 0)
         FROM detalles_ventas
         WHERE venta_id = ?",
    )
    .bind(venta_id)
    .fetch_one(&mut *conn)
    .await?;

    let result = sqlx::query("UPDATE ventas SET total = ?, modified_at = ? WHERE id = ?")
        .bind(total)
        .bind(Utc::now())
        .bind(venta_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Sale", venta_id));
    }

    debug!(venta_id, total, "Sale total recomputed");
    Ok(Money::from_units(total))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{customer, product, test_db};
    use chrono::TimeZone;
    use ventas_core::NewLineItem;

    fn line(producto_id: i64, precio: i64, descuento: i64, cantidad: i64) -> NewLineItem {
        NewLineItem {
            producto_id,
            precio,
            descuento,
            cantidad,
        }
    }

    #[tokio::test]
    async fn test_create_computes_total() {
        let db = test_db().await;
        let cliente = customer(&db, 1).await;
        let producto = product(&db, "Mochila", 100).await;

        let sale = db
            .sales()
            .create(&NewSale {
                cliente_id: cliente.id,
                fecha: None,
                detalles: vec![line(producto.id, 100, 10, 2)],
            })
            .await
            .unwrap();

        assert_eq!(sale.venta.total, 180);
        assert_eq!(sale.detalles.len(), 1);
        assert_eq!(sale.detalles[0].venta_id, sale.venta.id);

        let fetched = db.sales().get_by_id(sale.venta.id).await.unwrap().unwrap();
        assert_eq!(fetched, sale);
    }

    #[tokio::test]
    async fn test_create_empty_sale_totals_zero() {
        let db = test_db().await;
        let cliente = customer(&db, 1).await;
        let fecha = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        let sale = db
            .sales()
            .create(&NewSale {
                cliente_id: cliente.id,
                fecha: Some(fecha),
                detalles: vec![],
            })
            .await
            .unwrap();

        assert_eq!(sale.venta.total, 0);
        assert_eq!(sale.venta.fecha, fecha);
        assert!(sale.detalles.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_customer_or_product_rolls_back() {
        let db = test_db().await;
        let cliente = customer(&db, 1).await;

        let err = db
            .sales()
            .create(&NewSale {
                cliente_id: 999,
                fecha: None,
                detalles: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        let err = db
            .sales()
            .create(&NewSale {
                cliente_id: cliente.id,
                fecha: None,
                detalles: vec![line(12345, 100, 0, 1)],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        // The header of the failed sale was rolled back with its lines
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_header_update_keeps_total_and_lines() {
        let db = test_db().await;
        let ana = customer(&db, 1).await;
        let beto = customer(&db, 2).await;
        let producto = product(&db, "Libro", 5000).await;

        let sale = db
            .sales()
            .create(&NewSale {
                cliente_id: ana.id,
                fecha: None,
                detalles: vec![line(producto.id, 5000, 0, 1)],
            })
            .await
            .unwrap();

        let updated = db
            .sales()
            .update(
                sale.venta.id,
                &SaleUpdate {
                    cliente_id: Some(beto.id),
                    fecha: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.venta.cliente_id, beto.id);
        assert_eq!(updated.venta.fecha, sale.venta.fecha);
        assert_eq!(updated.venta.total, 5000);
        assert_eq!(updated.detalles, sale.detalles);

        let err = db
            .sales()
            .update(
                sale.venta.id,
                &SaleUpdate {
                    cliente_id: Some(777),
                    fecha: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_groups_lines_by_sale() {
        let db = test_db().await;
        let cliente = customer(&db, 1).await;
        let producto = product(&db, "Tijeras", 1000).await;

        for cantidad in 1..=3 {
            let detalles = (0..cantidad).map(|_| line(producto.id, 1000, 0, 1)).collect();
            db.sales()
                .create(&NewSale {
                    cliente_id: cliente.id,
                    fecha: None,
                    detalles,
                })
                .await
                .unwrap();
        }

        let page = db.sales().list(Page::new(1, 10)).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].detalles.len(), 2);
        assert_eq!(page[1].detalles.len(), 3);
        assert_eq!(page[1].venta.total, 3000);
        assert!(page
            .iter()
            .all(|s| s.detalles.iter().all(|d| d.venta_id == s.venta.id)));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_lines_but_not_products() {
        let db = test_db().await;
        let cliente = customer(&db, 1).await;
        let producto = product(&db, "Carpeta", 700).await;

        let sale = db
            .sales()
            .create(&NewSale {
                cliente_id: cliente.id,
                fecha: None,
                detalles: vec![line(producto.id, 700, 0, 2), line(producto.id, 700, 100, 1)],
            })
            .await
            .unwrap();

        assert!(db.sales().delete(sale.venta.id).await.unwrap());
        assert_eq!(db.line_items().count().await.unwrap(), 0);
        assert!(db.products().get_by_id(producto.id).await.unwrap().is_some());
        assert!(!db.sales().delete(sale.venta.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_customer_delete_cascades_to_sales_and_lines() {
        let db = test_db().await;
        let ana = customer(&db, 1).await;
        let beto = customer(&db, 2).await;
        let producto = product(&db, "Estuche", 2500).await;

        for cliente_id in [ana.id, ana.id, beto.id] {
            db.sales()
                .create(&NewSale {
                    cliente_id,
                    fecha: None,
                    detalles: vec![line(producto.id, 2500, 0, 1)],
                })
                .await
                .unwrap();
        }

        assert!(db.customers().delete(ana.id).await.unwrap());

        let remaining = db.sales().list(Page::default()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].venta.cliente_id, beto.id);
        assert_eq!(db.line_items().count().await.unwrap(), 1);
        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_recompute_on_missing_sale_is_not_found() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let err = recompute_total(&mut conn, 404).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
