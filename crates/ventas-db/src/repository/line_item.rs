//! # Line Item Repository
//!
//! Database operations for sale line items (`detalles_ventas`).
//!
//! Every mutation here changes a sale's total, so each one runs in a
//! transaction that also calls [`recompute_total`] before committing.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::sale::{fetch_sale, recompute_total};
use crate::repository::{new_external_id, page_bounds};
use ventas_core::validation::validate_line_amounts;
use ventas_core::{LineItem, LineItemUpdate, NewStandaloneLineItem, Page};

pub(crate) const LINE_ITEM_COLUMNS: &str =
    "id, uuid, venta_id, producto_id, precio, descuento, cantidad, created_at, modified_at";

/// Repository for line item database operations.
#[derive(Debug, Clone)]
pub struct LineItemRepository {
    pool: SqlitePool,
}

impl LineItemRepository {
    /// Creates a new LineItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LineItemRepository { pool }
    }

    /// Adds a line to an existing sale and recomputes the sale's total.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown sale or product
    pub async fn create(&self, input: &NewStandaloneLineItem) -> DbResult<LineItem> {
        debug!(
            venta_id = input.venta_id,
            producto_id = input.producto_id,
            "Adding line item"
        );

        let mut tx = self.pool.begin().await?;

        let item = insert(&mut tx, input, Utc::now()).await?;
        recompute_total(&mut tx, item.venta_id).await?;

        tx.commit().await?;
        Ok(item)
    }

    /// Gets a line item by internal id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<LineItem>> {
        fetch_item(&self.pool, id).await
    }

    /// Lists line items across all sales, ordered by id.
    pub async fn list(&self, page: Page) -> DbResult<Vec<LineItem>> {
        let (limit, offset) = page_bounds(page);

        let items = sqlx::query_as::<_, LineItem>(&format!(
            "SELECT {LINE_ITEM_COLUMNS} FROM detalles_ventas ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists the line items of one sale.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No sale with this id
    pub async fn list_by_sale(&self, venta_id: i64) -> DbResult<Vec<LineItem>> {
        if fetch_sale(&self.pool, venta_id).await?.is_none() {
            return Err(DbError::not_found("Sale", venta_id));
        }

        fetch_for_sale(&self.pool, venta_id).await
    }

    /// Applies a partial update and recomputes the owning sale's total.
    ///
    /// The merged amounts are re-checked so a partial update cannot produce
    /// a line whose subtotal overflows.
    pub async fn update(&self, id: i64, changes: &LineItemUpdate) -> DbResult<LineItem> {
        debug!(id, "Updating line item");

        let mut tx = self.pool.begin().await?;

        let current = fetch_item(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("LineItem", id))?;

        validate_line_amounts(
            changes.precio.unwrap_or(current.precio),
            changes.descuento.unwrap_or(current.descuento),
            changes.cantidad.unwrap_or(current.cantidad),
        )?;

        let item = sqlx::query_as::<_, LineItem>(&format!(
            "UPDATE detalles_ventas SET
                precio = COALESCE(?, precio),
                descuento = COALESCE(?, descuento),
                cantidad = COALESCE(?, cantidad),
                modified_at = ?
             WHERE id = ?
             RETURNING {LINE_ITEM_COLUMNS}"
        ))
        .bind(changes.precio)
        .bind(changes.descuento)
        .bind(changes.cantidad)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        recompute_total(&mut tx, item.venta_id).await?;

        tx.commit().await?;
        Ok(item)
    }

    /// Deletes a line item and recomputes its sale's total.
    ///
    /// Returns whether a line item existed.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id, "Deleting line item");

        let mut tx = self.pool.begin().await?;

        let venta_id: Option<i64> =
            sqlx::query_scalar("SELECT venta_id FROM detalles_ventas WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(venta_id) = venta_id else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM detalles_ventas WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        recompute_total(&mut tx, venta_id).await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Counts line items (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM detalles_ventas")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Inserts one line on an open transaction. The caller recomputes the total.
pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    input: &NewStandaloneLineItem,
    now: DateTime<Utc>,
) -> DbResult<LineItem> {
    let item = sqlx::query_as::<_, LineItem>(&format!(
        "INSERT INTO detalles_ventas
            (uuid, venta_id, producto_id, precio, descuento, cantidad, created_at, modified_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING {LINE_ITEM_COLUMNS}"
    ))
    .bind(new_external_id())
    .bind(input.venta_id)
    .bind(input.producto_id)
    .bind(input.precio)
    .bind(input.descuento)
    .bind(input.cantidad)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(item)
}

/// Fetches the lines of one sale, ordered by id.
pub(crate) async fn fetch_for_sale<'e, E>(executor: E, venta_id: i64) -> DbResult<Vec<LineItem>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let items = sqlx::query_as::<_, LineItem>(&format!(
        "SELECT {LINE_ITEM_COLUMNS} FROM detalles_ventas WHERE venta_id = ? ORDER BY id"
    ))
    .bind(venta_id)
    .fetch_all(executor)
    .await?;

    Ok(items)
}

/// Fetches the lines of the given sales, grouped by sale id.
pub(crate) async fn fetch_for_sales<'e, E>(
    executor: E,
    venta_ids: &[i64],
) -> DbResult<HashMap<i64, Vec<LineItem>>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut by_sale: HashMap<i64, Vec<LineItem>> = HashMap::new();
    if venta_ids.is_empty() {
        return Ok(by_sale);
    }

    let mut query = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {LINE_ITEM_COLUMNS} FROM detalles_ventas WHERE venta_id IN ("
    ));
    let mut ids = query.separated(", ");
    for id in venta_ids {
        ids.push_bind(*id);
    }
    ids.push_unseparated(") ORDER BY id");

    let items = query
        .build_query_as::<LineItem>()
        .fetch_all(executor)
        .await?;

    for item in items {
        by_sale.entry(item.venta_id).or_default().push(item);
    }

    Ok(by_sale)
}

async fn fetch_item<'e, E>(executor: E, id: i64) -> DbResult<Option<LineItem>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let item = sqlx::query_as::<_, LineItem>(&format!(
        "SELECT {LINE_ITEM_COLUMNS} FROM detalles_ventas WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(item)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{customer, product, test_db};
    use crate::Database;
    use ventas_core::totals::sale_total;
    use ventas_core::{NewLineItem, NewSale};

    async fn empty_sale(db: &Database) -> i64 {
        let cliente = customer(db, 1).await;
        db.sales()
            .create(&NewSale {
                cliente_id: cliente.id,
                fecha: None,
                detalles: vec![],
            })
            .await
            .unwrap()
            .venta
            .id
    }

    fn standalone(venta_id: i64, producto_id: i64, precio: i64, descuento: i64, cantidad: i64) -> NewStandaloneLineItem {
        NewStandaloneLineItem {
            venta_id,
            producto_id,
            precio,
            descuento,
            cantidad,
        }
    }

    async fn stored_total(db: &Database, venta_id: i64) -> i64 {
        db.sales().get_by_id(venta_id).await.unwrap().unwrap().venta.total
    }

    #[tokio::test]
    async fn test_total_tracks_every_mutation() {
        let db = test_db().await;
        let venta_id = empty_sale(&db).await;
        let producto = product(&db, "Plumón", 800).await;
        let items = db.line_items();

        let a = items.create(&standalone(venta_id, producto.id, 800, 0, 3)).await.unwrap();
        assert_eq!(stored_total(&db, venta_id).await, 2400);

        let b = items.create(&standalone(venta_id, producto.id, 500, 50, 2)).await.unwrap();
        assert_eq!(stored_total(&db, venta_id).await, 2400 + 900);

        items
            .update(
                a.id,
                &LineItemUpdate {
                    cantidad: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(stored_total(&db, venta_id).await, 800 + 900);

        assert!(items.delete(b.id).await.unwrap());
        assert_eq!(stored_total(&db, venta_id).await, 800);

        assert!(items.delete(a.id).await.unwrap());
        assert_eq!(stored_total(&db, venta_id).await, 0);
    }

    #[tokio::test]
    async fn test_stored_total_matches_sum_of_current_lines() {
        let db = test_db().await;
        let venta_id = empty_sale(&db).await;
        let producto = product(&db, "Clip", 50).await;
        let items = db.line_items();

        let mut ids = Vec::new();
        for (precio, descuento, cantidad) in [(50, 0, 10), (75, 5, 4), (120, 20, 1), (10, 0, 7)] {
            let item = items
                .create(&standalone(venta_id, producto.id, precio, descuento, cantidad))
                .await
                .unwrap();
            ids.push(item.id);
        }
        items
            .update(
                ids[1],
                &LineItemUpdate {
                    precio: Some(90),
                    descuento: Some(0),
                    cantidad: None,
                },
            )
            .await
            .unwrap();
        items.delete(ids[2]).await.unwrap();

        let current = items.list_by_sale(venta_id).await.unwrap();
        let expected = sale_total(&current).unwrap();
        assert_eq!(stored_total(&db, venta_id).await, expected.units());
        assert_eq!(expected.units(), 500 + 360 + 70);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_links_and_other_amounts() {
        let db = test_db().await;
        let venta_id = empty_sale(&db).await;
        let producto = product(&db, "Corchetera", 4000).await;

        let created = db
            .line_items()
            .create(&standalone(venta_id, producto.id, 4000, 500, 2))
            .await
            .unwrap();

        let updated = db
            .line_items()
            .update(
                created.id,
                &LineItemUpdate {
                    descuento: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.descuento, 0);
        assert_eq!(updated.precio, 4000);
        assert_eq!(updated.cantidad, 2);
        assert_eq!(updated.venta_id, venta_id);
        assert_eq!(updated.producto_id, producto.id);
        assert_eq!(updated.uuid, created.uuid);
    }

    #[tokio::test]
    async fn test_overflowing_update_is_rejected_and_rolled_back() {
        let db = test_db().await;
        let venta_id = empty_sale(&db).await;
        let producto = product(&db, "Tinta", 1000).await;

        let created = db
            .line_items()
            .create(&standalone(venta_id, producto.id, 1000, 0, 1))
            .await
            .unwrap();

        let err = db
            .line_items()
            .update(
                created.id,
                &LineItemUpdate {
                    cantidad: Some(i64::MAX),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let unchanged = db.line_items().get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(unchanged.cantidad, 1);
        assert_eq!(stored_total(&db, venta_id).await, 1000);
    }

    #[tokio::test]
    async fn test_unknown_sale_is_constraint_violation() {
        let db = test_db().await;
        let producto = product(&db, "Sobre", 100).await;

        let err = db
            .line_items()
            .create(&standalone(404, producto.id, 100, 0, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(db.line_items().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_ids() {
        let db = test_db().await;
        let items = db.line_items();

        assert!(!items.delete(99).await.unwrap());
        assert!(items.get_by_id(99).await.unwrap().is_none());
        assert!(matches!(
            items.update(99, &LineItemUpdate::default()).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
        assert!(matches!(
            items.list_by_sale(99).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_fetch_for_sales_only_returns_requested_sales() {
        let db = test_db().await;
        let cliente = customer(&db, 1).await;
        let producto = product(&db, "Cola fría", 150).await;

        let mut venta_ids = Vec::new();
        for cantidad in 1..=3 {
            let sale = db
                .sales()
                .create(&NewSale {
                    cliente_id: cliente.id,
                    fecha: None,
                    detalles: vec![NewLineItem {
                        producto_id: producto.id,
                        precio: 150,
                        descuento: 0,
                        cantidad,
                    }],
                })
                .await
                .unwrap();
            venta_ids.push(sale.venta.id);
        }

        let by_sale = fetch_for_sales(db.pool(), &[venta_ids[0], venta_ids[2]])
            .await
            .unwrap();
        assert_eq!(by_sale.len(), 2);
        assert_eq!(by_sale[&venta_ids[2]][0].cantidad, 3);
        assert!(!by_sale.contains_key(&venta_ids[1]));

        assert!(fetch_for_sales(db.pool(), &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_spans_sales() {
        let db = test_db().await;
        let cliente = customer(&db, 1).await;
        let producto = product(&db, "Cinta", 300).await;

        for _ in 0..2 {
            db.sales()
                .create(&NewSale {
                    cliente_id: cliente.id,
                    fecha: None,
                    detalles: vec![NewLineItem {
                        producto_id: producto.id,
                        precio: 300,
                        descuento: 0,
                        cantidad: 1,
                    }],
                })
                .await
                .unwrap();
        }

        let all = db.line_items().list(Page::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_ne!(all[0].venta_id, all[1].venta_id);
        assert_eq!(db.line_items().list(Page::new(1, 100)).await.unwrap().len(), 1);
    }
}
