//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every price, tax and total is an i64 count of minor units.           │
//! │    Only the display layer turns cents into "$10.99".                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::Quantity;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let line = price.multiply_quantity(Quantity::from_units(2));
//! assert_eq!(line.cents(), 2198);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::quantity::{Quantity, QUANTITY_SCALE};
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for stock-value deltas and refunds
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Parses a decimal amount typed by the operator ("10", "10.5", "10.99").
    ///
    /// At most two fractional digits are accepted.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::parse("10.99").unwrap().cents(), 1099);
    /// assert_eq!(Money::parse("3.5").unwrap().cents(), 350);
    /// assert!(Money::parse("1.999").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Money, ValidationError> {
        let text = input.trim();
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' {}", text, reason),
        };

        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("is not an amount"));
        }
        if frac.len() > 2 {
            return Err(invalid("has more than two decimal places"));
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("is not an amount"));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("is too large"))?
        };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid("is not an amount"))? * 10,
            _ => frac.parse().map_err(|_| invalid("is not an amount"))?,
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(|| invalid("is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Calculates tax at the given rate, rounding half up.
    ///
    /// Saturates at the i64 bounds; see [`Money::checked_tax`].
    ///
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::types::TaxRate;
    ///
    /// let price = Money::from_cents(2000);  // $20.00
    /// let rate = TaxRate::from_bps(1000);   // 10%
    /// assert_eq!(price.calculate_tax(rate).cents(), 200);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money::saturate(tax_cents(self.0, rate))
    }

    /// Like [`Money::calculate_tax`], but `None` when the result does not fit.
    pub fn checked_tax(&self, rate: TaxRate) -> Option<Money> {
        i64::try_from(tax_cents(self.0, rate)).ok().map(Money)
    }

    /// Multiplies a unit price by a (possibly fractional) quantity.
    ///
    /// The result is rounded to the nearest cent, half away from zero, and
    /// saturates at the i64 bounds. Totals that are written use
    /// [`Money::checked_multiply_quantity`].
    ///
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::Quantity;
    ///
    /// let per_kg = Money::from_cents(399);
    /// let line = per_kg.multiply_quantity(Quantity::from_milli(1500)); // 1.5 kg
    /// assert_eq!(line.cents(), 599); // 598.5 → 599
    /// ```
    pub fn multiply_quantity(&self, qty: Quantity) -> Money {
        Money::saturate(line_cents(self.0, qty))
    }

    /// Like [`Money::multiply_quantity`], but `None` when the result does not fit.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::Quantity;
    ///
    /// let price = Money::from_cents(10_000);
    /// assert!(price.checked_multiply_quantity(Quantity::from_units(3)).is_some());
    /// assert!(price.checked_multiply_quantity(Quantity::from_milli(i64::MAX)).is_none());
    /// ```
    pub fn checked_multiply_quantity(&self, qty: Quantity) -> Option<Money> {
        i64::try_from(line_cents(self.0, qty)).ok().map(Money)
    }

    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    fn saturate(cents: i128) -> Money {
        Money(cents.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Returns the discount amount for this value.
    ///
    /// Percentage discounts are computed like tax. Flat discounts never exceed
    /// the amount they are applied to.
    pub fn discount(&self, discount: Discount) -> Money {
        match discount {
            Discount::Percentage(rate) => self.calculate_tax(rate),
            Discount::Flat(amount) => amount.min(*self),
        }
    }
}

// Integer math: `(amount * rate + 5000) / 10000`, the +5000 rounds half up.
fn tax_cents(cents: i64, rate: TaxRate) -> i128 {
    (cents as i128 * rate.bps() as i128 + 5000) / 10000
}

fn line_cents(cents: i64, qty: Quantity) -> i128 {
    let product = cents as i128 * qty.milli() as i128;
    let scale = QUANTITY_SCALE as i128;
    let rounded = (product.abs() + scale / 2) / scale;
    if product < 0 {
        -rounded
    } else {
        rounded
    }
}

/// A discount applied to an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discount {
    /// Percentage of the amount (in basis points).
    Percentage(TaxRate),
    /// Fixed amount off.
    Flat(Money),
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering. Store-facing output goes through
/// [`crate::format::format_currency`] which honours the configured symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse(".99").unwrap().cents(), 99);
        assert_eq!(Money::parse("-2.25").unwrap().cents(), -225);
        assert!(Money::parse("").is_err());
        assert!(Money::parse("ten").is_err());
        assert!(Money::parse("1.234").is_err());
        assert!(Money::parse("1,50").is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let sum: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(sum.cents(), 2000);
    }

    #[test]
    fn test_tax_calculation_basic() {
        // $10.00 at 10% = $1.00
        let amount = Money::from_cents(1000);
        let tax = amount.calculate_tax(TaxRate::from_bps(1000));
        assert_eq!(tax.cents(), 100);
    }

    #[test]
    fn test_tax_calculation_with_rounding() {
        // $10.00 at 8.25% = $0.825 → $0.83
        let amount = Money::from_cents(1000);
        let tax = amount.calculate_tax(TaxRate::from_bps(825));
        assert_eq!(tax.cents(), 83);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        assert_eq!(unit_price.multiply_quantity(Quantity::from_units(3)).cents(), 897);
        assert_eq!(unit_price.multiply_quantity(Quantity::from_milli(500)).cents(), 150);
        assert_eq!(unit_price.multiply_quantity(Quantity::zero()).cents(), 0);
    }

    #[test]
    fn test_overflow_is_reported_not_wrapped() {
        let price = Money::from_cents(10_000);
        let huge = Quantity::from_milli(1_000_000_000_000_000_000);

        assert_eq!(price.checked_multiply_quantity(huge), None);
        assert_eq!(price.multiply_quantity(huge).cents(), i64::MAX);
        assert_eq!(Money::from_cents(i64::MAX).checked_tax(TaxRate::from_bps(20_000)), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
        assert_eq!(
            (Money::from_cents(i64::MAX) + Money::from_cents(1)).cents(),
            i64::MAX
        );
    }

    #[test]
    fn test_discount() {
        let subtotal = Money::from_cents(10000);
        assert_eq!(
            subtotal.discount(Discount::Percentage(TaxRate::from_bps(1000))).cents(),
            1000
        );
        assert_eq!(subtotal.discount(Discount::Flat(Money::from_cents(250))).cents(), 250);
        // A flat discount larger than the amount is capped
        assert_eq!(
            Money::from_cents(100).discount(Discount::Flat(Money::from_cents(500))).cents(),
            100
        );
    }
}
