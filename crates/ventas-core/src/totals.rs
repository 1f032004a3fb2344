//! # Sale Totals
//!
//! The one formula that keeps a sale's stored total honest:
//!
//! ```text
//! total = Σ (precio - descuento) * cantidad      over the sale's line items
//!       = 0                                      when there are none
//! ```
//!
//! The database layer evaluates the same expression in SQL when it recomputes
//! a sale after a line-item mutation; this module evaluates it in Rust for the
//! batch of lines supplied when a sale is created.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{LineItem, NewLineItem, NewStandaloneLineItem};

/// Anything that carries the three amounts of a sale line.
pub trait LineAmounts {
    fn precio(&self) -> i64;
    fn descuento(&self) -> i64;
    fn cantidad(&self) -> i64;

    /// `(precio - descuento) * cantidad` for this line.
    fn subtotal(&self) -> CoreResult<Money> {
        line_subtotal(self.precio(), self.descuento(), self.cantidad())
    }
}

/// Computes `(precio - descuento) * cantidad` with overflow checks.
///
/// ## Example
/// ```rust
/// use ventas_core::totals::line_subtotal;
///
/// assert_eq!(line_subtotal(100, 10, 2).unwrap().units(), 180);
/// assert!(line_subtotal(i64::MAX, 0, 2).is_err());
/// ```
pub fn line_subtotal(precio: i64, descuento: i64, cantidad: i64) -> CoreResult<Money> {
    precio
        .checked_sub(descuento)
        .map(Money::from_units)
        .and_then(|net| net.checked_mul(cantidad))
        .ok_or_else(|| CoreError::AmountOverflow {
            context: "line subtotal".to_string(),
        })
}

/// Sums the subtotals of a batch of lines. An empty batch totals zero.
pub fn sale_total<'a, T, I>(items: I) -> CoreResult<Money>
where
    T: LineAmounts + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().try_fold(Money::zero(), |acc, item| {
        acc.checked_add(item.subtotal()?)
            .ok_or_else(|| CoreError::AmountOverflow {
                context: "sale total".to_string(),
            })
    })
}

macro_rules! impl_line_amounts {
    ($($ty:ty),*) => {
        $(
            impl LineAmounts for $ty {
                fn precio(&self) -> i64 {
                    self.precio
                }

                fn descuento(&self) -> i64 {
                    self.descuento
                }

                fn cantidad(&self) -> i64 {
                    self.cantidad
                }
            }
        )*
    };
}

impl_line_amounts!(LineItem, NewLineItem, NewStandaloneLineItem);

// =============================================================================
// Unit Tests
// =============================================================================
