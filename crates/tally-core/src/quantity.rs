//! # Quantity Module
//!
//! Stock levels and cart quantities may be fractional (0.5 kg, 1.25 m), so
//! they are stored as integer thousandths rather than floats.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Quantity(2500)  ══  2.5 units                                          │
//! │                                                                         │
//! │  storage   INTEGER 2500                                                 │
//! │  JSON      2.5      (whole numbers serialize as integers: 3)            │
//! │  display   "2.5"                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;

/// Thousandths per whole unit.
pub const QUANTITY_SCALE: i64 = 1000;

/// Largest quantity, in whole units, that any stock level, adjustment or
/// cart line may hold. Keeps `stock + delta` and `price × quantity` well
/// inside i64.
pub const MAX_QUANTITY_UNITS: i64 = 1_000_000_000;

/// A stock or cart quantity with three decimal places of precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Quantity(i64);

impl Quantity {
    /// One whole unit.
    pub const ONE: Quantity = Quantity(QUANTITY_SCALE);

    /// The largest accepted quantity, [`MAX_QUANTITY_UNITS`].
    pub const MAX: Quantity = Quantity(MAX_QUANTITY_UNITS * QUANTITY_SCALE);

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    /// Creates a quantity from thousandths of a unit.
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Creates a quantity from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * QUANTITY_SCALE)
    }

    /// Creates a quantity from a decimal value, rounding to the nearest thousandth.
    ///
    /// Returns `None` for NaN, infinities and anything beyond
    /// ±[`MAX_QUANTITY_UNITS`].
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value.abs() > MAX_QUANTITY_UNITS as f64 {
            return None;
        }
        Some(Quantity((value * QUANTITY_SCALE as f64).round() as i64))
    }

    /// True when the magnitude is at most [`Quantity::MAX`].
    #[inline]
    pub const fn is_in_range(&self) -> bool {
        self.0.unsigned_abs() <= Quantity::MAX.0 as u64
    }

    /// Returns the raw value in thousandths.
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    /// Returns the value as a float (display and serialization only).
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / QUANTITY_SCALE as f64
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// True when the value has no fractional part.
    #[inline]
    pub const fn is_whole(&self) -> bool {
        self.0 % QUANTITY_SCALE == 0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = QUANTITY_SCALE as u64;
        let whole = abs / scale;
        let frac = abs % scale;

        if frac == 0 {
            return write!(f, "{sign}{whole}");
        }

        let digits = format!("{frac:03}");
        write!(f, "{sign}{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for Quantity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: format!("'{}' is not a number", s.trim()),
        })?;
        if !value.is_finite() {
            return Err(ValidationError::InvalidFormat {
                field: "quantity".to_string(),
                reason: format!("'{}' is not a finite number", s.trim()),
            });
        }

        Quantity::from_f64(value).ok_or_else(|| ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: -MAX_QUANTITY_UNITS,
            max: MAX_QUANTITY_UNITS,
        })
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() {
            serializer.serialize_i64(self.0 / QUANTITY_SCALE)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Quantity::from_f64(value)
            .ok_or_else(|| serde::de::Error::custom("quantity must be a finite number within range"))
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(self.0.saturating_neg())
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_trims_fraction() {
        assert_eq!(Quantity::from_units(3).to_string(), "3");
        assert_eq!(Quantity::from_milli(2500).to_string(), "2.5");
        assert_eq!(Quantity::from_milli(125).to_string(), "0.125");
        assert_eq!(Quantity::from_milli(-1500).to_string(), "-1.5");
    }

    #[test]
    fn test_parse() {
        assert_eq!("2".parse::<Quantity>().unwrap(), Quantity::from_units(2));
        assert_eq!(" 0.25 ".parse::<Quantity>().unwrap(), Quantity::from_milli(250));
        assert!("abc".parse::<Quantity>().is_err());
        assert!("NaN".parse::<Quantity>().is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(matches!(
            "1e16".parse::<Quantity>(),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            "-1000000001".parse::<Quantity>(),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            "inf".parse::<Quantity>(),
            Err(ValidationError::InvalidFormat { .. })
        ));

        let max = MAX_QUANTITY_UNITS.to_string().parse::<Quantity>().unwrap();
        assert_eq!(max, Quantity::MAX);
        assert!(max.is_in_range());
        assert!(!Quantity::from_milli(i64::MAX).is_in_range());
    }

    #[test]
    fn test_json_rejects_out_of_range() {
        assert!(serde_json::from_str::<Quantity>("1e16").is_err());
    }

    #[test]
    fn test_json_shape() {
        assert_eq!(serde_json::to_string(&Quantity::from_units(4)).unwrap(), "4");
        assert_eq!(serde_json::to_string(&Quantity::from_milli(1500)).unwrap(), "1.5");

        let q: Quantity = serde_json::from_str("7").unwrap();
        assert_eq!(q, Quantity::from_units(7));
        let q: Quantity = serde_json::from_str("0.5").unwrap();
        assert_eq!(q, Quantity::from_milli(500));
    }

    #[test]
    fn test_arithmetic() {
        let a = Quantity::from_units(5);
        let b = Quantity::from_milli(1500);
        assert_eq!(a - b, Quantity::from_milli(3500));
        assert_eq!(a + b, Quantity::from_milli(6500));
        let total: Quantity = vec![a, b, Quantity::ONE].into_iter().sum();
        assert_eq!(total, Quantity::from_milli(7500));
    }
}
