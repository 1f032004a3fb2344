//! # Customer Repository
//!
//! Database operations for customers (`clientes`).
//!
//! `email` and `rut` are stored in normalized form (see
//! [`normalize_email`], [`normalize_rut`]) so their UNIQUE constraints
//! catch case and whitespace variants.
//!
//! Deleting a customer cascades to its sales and, through them, to their
//! line items (`ON DELETE CASCADE` on both foreign keys).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{new_external_id, page_bounds};
use ventas_core::validation::{normalize_email, normalize_rut};
use ventas_core::{Customer, CustomerUpdate, NewCustomer, Page};

const COLUMNS: &str = "id, uuid, nombre, email, rut, created_at, modified_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer with a fresh id and external uuid.
    ///
    /// ## Returns
    /// * `Ok(Customer)` - The stored customer
    /// * `Err(DbError::UniqueViolation)` - Email or rut already taken
    pub async fn create(&self, input: &NewCustomer) -> DbResult<Customer> {
        let email = normalize_email(&input.email);
        let rut = normalize_rut(&input.rut);
        debug!(email = %email, "Inserting customer");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let customer = sqlx::query_as::<_, Customer>(&format!(
            "INSERT INTO clientes (uuid, nombre, email, rut, created_at, modified_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        ))
        .bind(new_external_id())
        .bind(input.nombre.trim())
        .bind(&email)
        .bind(&rut)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            DbError::from(e).with_duplicate_value(|field| match field {
                "email" => Some(email.as_str()),
                "rut" => Some(rut.as_str()),
                _ => None,
            })
        })?;

        tx.commit().await?;

        debug!(id = customer.id, "Customer created");
        Ok(customer)
    }

    /// Gets a customer by internal id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {COLUMNS} FROM clientes WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists customers ordered by id.
    pub async fn list(&self, page: Page) -> DbResult<Vec<Customer>> {
        let (limit, offset) = page_bounds(page);

        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {COLUMNS} FROM clientes ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Applies a partial update. Absent fields keep their stored value.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No customer with this id
    /// * `Err(DbError::UniqueViolation)` - New email or rut already taken
    pub async fn update(&self, id: i64, changes: &CustomerUpdate) -> DbResult<Customer> {
        debug!(id, "Updating customer");

        let email = changes.email.as_deref().map(normalize_email);
        let rut = changes.rut.as_deref().map(normalize_rut);
        let mut tx = self.pool.begin().await?;

        let customer = sqlx::query_as::<_, Customer>(&format!(
            "UPDATE clientes SET
                nombre = COALESCE(?, nombre),
                email = COALESCE(?, email),
                rut = COALESCE(?, rut),
                modified_at = ?
             WHERE id = ?
             RETURNING {COLUMNS}"
        ))
        .bind(changes.nombre.as_deref().map(str::trim))
        .bind(email.as_deref())
        .bind(rut.as_deref())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            DbError::from(e).with_duplicate_value(|field| match field {
                "email" => email.as_deref(),
                "rut" => rut.as_deref(),
                _ => None,
            })
        })?
        .ok_or_else(|| DbError::not_found("Customer", id))?;

        tx.commit().await?;
        Ok(customer)
    }

    /// Deletes a customer together with its sales and their line items.
    ///
    /// Returns whether a customer existed.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id, "Deleting customer");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM clientes WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Counts customers (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clientes")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
