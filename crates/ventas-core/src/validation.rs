//! # Validation Module
//!
//! Input validation for Ventas.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum + serde)                                │
//! │  └── Shape checks: JSON syntax, field types, required fields           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Value checks: empty names, email format, negative prices          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE constraints (email, rut)                                   │
//! │  └── Foreign key constraints (cliente, venta, producto)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ventas_core::validation::{validate_email, validate_quantity};
//!
//! assert!(validate_email("ana@example.com").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::totals::{line_subtotal, sale_total};
use crate::types::{
    CustomerUpdate, LineItemUpdate, NewCustomer, NewLineItem, NewProduct, NewSale,
    NewStandaloneLineItem, ProductUpdate, SaleUpdate,
};
use crate::MAX_NAME_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_EMAIL_LEN: usize = 254;
const MAX_RUT_LEN: usize = 20;
const MAX_CATEGORY_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a customer or product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    validate_text("nombre", name, MAX_NAME_LEN)
}

/// Validates a product category.
pub fn validate_category(categoria: &str) -> ValidationResult<()> {
    validate_text("categoria", categoria, MAX_CATEGORY_LEN)
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@`, with a non-empty local part
/// - Domain contains a dot that is neither first nor last
/// - No whitespace
///
/// ## Example
/// ```rust
/// use ventas_core::validation::validate_email;
///
/// assert!(validate_email("ana@example.com").is_ok());
/// assert!(validate_email("ana.example.com").is_err());
/// assert!(validate_email("ana@localhost").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_text("email", email, MAX_EMAIL_LEN)?;

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("must contain '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must have exactly one '@' after a non-empty local part"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("domain must contain a dot"));
    }

    Ok(())
}

/// Validates a tax id (RUT).
///
/// ## Rules
/// - Must not be empty, at most 20 characters
/// - Only digits, letters, dots and hyphens (e.g. `12.345.678-K`)
pub fn validate_rut(rut: &str) -> ValidationResult<()> {
    validate_text("rut", rut, MAX_RUT_LEN)?;

    if !rut
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "rut".to_string(),
            reason: "must contain only digits, letters, dots and hyphens".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Normalization
// =============================================================================

/// Canonical stored form of an email: trimmed, domain lowercased.
///
/// The local part keeps its case. Uniqueness is enforced on this form.
///
/// ```rust
/// use ventas_core::validation::normalize_email;
///
/// assert_eq!(normalize_email(" Ana@EXAMPLE.com "), "Ana@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_ascii_lowercase()),
        None => email.to_string(),
    }
}

/// Canonical stored form of a tax id: trimmed.
pub fn normalize_rut(rut: &str) -> String {
    rut.trim().to_string()
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price. Zero is allowed (free items).
pub fn validate_price(precio: i64) -> ValidationResult<()> {
    if precio < 0 {
        return Err(ValidationError::OutOfRange {
            field: "precio".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a per-unit discount.
pub fn validate_discount(descuento: i64) -> ValidationResult<()> {
    if descuento < 0 {
        return Err(ValidationError::OutOfRange {
            field: "descuento".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_quantity(cantidad: i64) -> ValidationResult<()> {
    if cantidad <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "cantidad".to_string(),
        });
    }

    Ok(())
}

/// Validates a reference to another record's internal id.
pub fn validate_reference(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Payload Validators
// =============================================================================

impl NewCustomer {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.nombre)?;
        validate_email(&self.email)?;
        validate_rut(&self.rut)
    }
}

impl CustomerUpdate {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(nombre) = &self.nombre {
            validate_name(nombre)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(rut) = &self.rut {
            validate_rut(rut)?;
        }
        Ok(())
    }
}

impl NewProduct {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.nombre)?;
        if let Some(categoria) = &self.categoria {
            validate_category(categoria)?;
        }
        validate_price(self.precio)
    }
}

impl ProductUpdate {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(nombre) = &self.nombre {
            validate_name(nombre)?;
        }
        if let Some(categoria) = &self.categoria {
            validate_category(categoria)?;
        }
        if let Some(precio) = self.precio {
            validate_price(precio)?;
        }
        Ok(())
    }
}

fn amount_out_of_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: i64::MIN,
        max: i64::MAX,
    }
}

/// Validates the three amounts of a line and that its subtotal fits in an `i64`.
pub fn validate_line_amounts(precio: i64, descuento: i64, cantidad: i64) -> ValidationResult<()> {
    validate_price(precio)?;
    validate_discount(descuento)?;
    validate_quantity(cantidad)?;
    line_subtotal(precio, descuento, cantidad).map_err(|_| amount_out_of_range("subtotal"))?;
    Ok(())
}

fn validate_line(producto_id: i64, precio: i64, descuento: i64, cantidad: i64) -> ValidationResult<()> {
    validate_reference("producto_id", producto_id)?;
    validate_line_amounts(precio, descuento, cantidad)
}

impl NewLineItem {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_line(self.producto_id, self.precio, self.descuento, self.cantidad)
    }
}

impl NewStandaloneLineItem {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_reference("venta_id", self.venta_id)?;
        validate_line(self.producto_id, self.precio, self.descuento, self.cantidad)
    }
}

impl LineItemUpdate {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(precio) = self.precio {
            validate_price(precio)?;
        }
        if let Some(descuento) = self.descuento {
            validate_discount(descuento)?;
        }
        if let Some(cantidad) = self.cantidad {
            validate_quantity(cantidad)?;
        }
        Ok(())
    }
}

impl NewSale {
    /// Validates the header, every line, and that the total is representable.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_reference("cliente_id", self.cliente_id)?;
        for item in &self.detalles {
            item.validate()?;
        }
        sale_total(&self.detalles).map_err(|_| amount_out_of_range("total"))?;
        Ok(())
    }
}

impl SaleUpdate {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(cliente_id) = self.cliente_id {
            validate_reference("cliente_id", cliente_id)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Ana Pérez").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("a.b+tag@sub.example.cl").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("ana").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@@example.com").is_err());
        assert!(validate_email("ana@example.").is_err());
        assert!(validate_email("ana @example.com").is_err());
    }

    #[test]
    fn test_validate_rut() {
        assert!(validate_rut("12.345.678-K").is_ok());
        assert!(validate_rut("11111111-1").is_ok());
        assert!(validate_rut("").is_err());
        assert!(validate_rut("12 345").is_err());
        assert!(validate_rut(&"1".repeat(30)).is_err());
    }

    #[test]
    fn test_normalized_forms() {
        assert_eq!(normalize_email("ana@EXAMPLE.com"), "ana@example.com");
        assert_eq!(normalize_email("Ana@Example.Com"), "Ana@example.com");
        assert_eq!(normalize_rut(" 12345678-5 "), "12345678-5");
        assert!(validate_rut(" 12345678-5 ").is_ok());
    }

    #[test]
    fn test_numeric_validators() {
        assert!(validate_price(0).is_ok());
        assert!(validate_price(-1).is_err());
        assert!(validate_discount(0).is_ok());
        assert!(validate_discount(-5).is_err());
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_reference("cliente_id", 0).is_err());
        assert!(validate_line_amounts(100, 10, 2).is_ok());
        assert!(validate_line_amounts(i64::MAX, 0, 2).is_err());
    }

    #[test]
    fn test_partial_update_validates_only_present_fields() {
        let update = CustomerUpdate {
            nombre: None,
            email: Some("nuevo@example.com".to_string()),
            rut: None,
        };
        assert!(update.validate().is_ok());

        let update = CustomerUpdate {
            email: Some("broken".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        assert!(LineItemUpdate::default().validate().is_ok());
        assert!(LineItemUpdate {
            cantidad: Some(0),
            ..Default::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_new_sale_validation() {
        let sale = NewSale {
            cliente_id: 1,
            fecha: None,
            detalles: vec![NewLineItem {
                producto_id: 2,
                precio: 100,
                descuento: 10,
                cantidad: 2,
            }],
        };
        assert!(sale.validate().is_ok());

        let overflowing = NewSale {
            detalles: vec![
                NewLineItem {
                    producto_id: 2,
                    precio: i64::MAX,
                    descuento: 0,
                    cantidad: 1,
                },
                NewLineItem {
                    producto_id: 2,
                    precio: 1,
                    descuento: 0,
                    cantidad: 1,
                },
            ],
            ..sale.clone()
        };
        assert!(overflowing.validate().is_err());

        let bad_line = NewSale {
            detalles: vec![NewLineItem {
                producto_id: 2,
                precio: 100,
                descuento: 0,
                cantidad: -1,
            }],
            ..sale
        };
        assert!(bad_line.validate().is_err());
    }
}
