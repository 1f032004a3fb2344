//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Prices, discounts and totals are whole currency units.                 │
//! │                                                                         │
//! │    (precio - descuento) * cantidad                                      │
//! │    (100    - 10       ) * 2        = 180   exact, no rounding           │
//! │                                                                         │
//! │  Storing i64 end to end (JSON, SQLite INTEGER, Rust) keeps the stored   │
//! │  sale total bit-for-bit equal to the sum of its lines.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ventas_core::money::Money;
//!
//! let net = Money::from_units(100 - 10);
//! assert_eq!(net.checked_mul(2).map(|m| m.units()), Some(180));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole currency units.
///
/// ## Design Decisions
/// - **i64 (signed)**: a discount larger than the price yields a negative line,
///   which the arithmetic must represent rather than wrap
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Checked helpers only**: `checked_add` / `checked_mul` for totals built from
///   client input
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the value in whole units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Adds two values, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use ventas_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(90).checked_mul(2), Some(Money::from_units(180)));
    /// assert_eq!(Money::from_units(i64::MAX).checked_mul(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display. Clients format amounts themselves.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-${}", self.0.unsigned_abs())
        } else {
            write!(f, "${}", self.0)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units() {
        let money = Money::from_units(1099);
        assert_eq!(money.units(), 1099);
        assert_eq!(Money::zero().units(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_units(1500)), "$1500");
        assert_eq!(format!("{}", Money::from_units(0)), "$0");
        assert_eq!(format!("{}", Money::from_units(-30)), "-$30");
    }

    #[test]
    fn test_checked_operations() {
        assert_eq!(
            Money::from_units(i64::MAX).checked_add(Money::from_units(1)),
            None
        );
        assert_eq!(
            Money::from_units(1).checked_add(Money::from_units(2)),
            Some(Money::from_units(3))
        );
    }
}
