//! # Product Repository
//!
//! Database operations for products (`productos`).
//!
//! ## Price Snapshot
//! ```text
//! productos.precio        current list price, free to change
//! detalles_ventas.precio  price applied at sale time, never follows the product
//! ```
//! Updating a product's price therefore never touches existing sales.
//!
//! ## Deletion
//! Line items reference products with `ON DELETE RESTRICT`: a product that
//! appears on any sale cannot be deleted (`DbError::ForeignKeyViolation`).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{new_external_id, page_bounds};
use ventas_core::{NewProduct, Page, Product, ProductUpdate};

const COLUMNS: &str = "id, uuid, nombre, categoria, precio, created_at, modified_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    pub async fn create(&self, input: &NewProduct) -> DbResult<Product> {
        debug!(nombre = %input.nombre, precio = input.precio, "Inserting product");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO productos (uuid, nombre, categoria, precio, created_at, modified_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        ))
        .bind(new_external_id())
        .bind(input.nombre.trim())
        .bind(input.categoria.as_deref().map(str::trim))
        .bind(input.precio)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(product)
    }

    /// Gets a product by internal id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM productos WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products ordered by id.
    pub async fn list(&self, page: Page) -> DbResult<Vec<Product>> {
        let (limit, offset) = page_bounds(page);

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM productos ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Applies a partial update.
    ///
    /// `categoria` can be changed but not cleared: `None` means "keep".
    pub async fn update(&self, id: i64, changes: &ProductUpdate) -> DbResult<Product> {
        debug!(id, "Updating product");

        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE productos SET
                nombre = COALESCE(?, nombre),
                categoria = COALESCE(?, categoria),
                precio = COALESCE(?, precio),
                modified_at = ?
             WHERE id = ?
             RETURNING {COLUMNS}"
        ))
        .bind(changes.nombre.as_deref().map(str::trim))
        .bind(changes.categoria.as_deref().map(str::trim))
        .bind(changes.precio)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))?;

        tx.commit().await?;
        Ok(product)
    }

    /// Deletes a product. Returns whether a product existed.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - Line items still reference it
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id, "Deleting product");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM productos WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM productos")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{customer, product, test_db};
    use ventas_core::{NewLineItem, NewSale};

    #[tokio::test]
    async fn test_create_without_category() {
        let db = test_db().await;
        let created = db
            .products()
            .create(&NewProduct {
                nombre: "Lápiz".to_string(),
                categoria: None,
                precio: 300,
            })
            .await
            .unwrap();

        assert_eq!(created.categoria, None);
        assert_eq!(created.precio, 300);
        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_price_update_keeps_other_fields() {
        let db = test_db().await;
        let created = product(&db, "Cuaderno", 1500).await;

        let updated = db
            .products()
            .update(
                created.id,
                &ProductUpdate {
                    precio: Some(1800),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.precio, 1800);
        assert_eq!(updated.nombre, "Cuaderno");
        assert_eq!(updated.categoria.as_deref(), Some("General"));
    }

    #[tokio::test]
    async fn test_delete_referenced_product_is_restricted() {
        let db = test_db().await;
        let cliente = customer(&db, 1).await;
        let producto = product(&db, "Goma", 200).await;

        db.sales()
            .create(&NewSale {
                cliente_id: cliente.id,
                fecha: None,
                detalles: vec![NewLineItem {
                    producto_id: producto.id,
                    precio: 200,
                    descuento: 0,
                    cantidad: 1,
                }],
            })
            .await
            .unwrap();

        let err = db.products().delete(producto.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(db.products().get_by_id(producto.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_unreferenced_product() {
        let db = test_db().await;
        let producto = product(&db, "Regla", 500).await;

        assert!(db.products().delete(producto.id).await.unwrap());
        assert!(!db.products().delete(producto.id).await.unwrap());
    }
}
