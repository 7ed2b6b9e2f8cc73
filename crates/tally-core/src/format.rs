//! # Display Formatting
//!
//! Currency and date formatting shared by receipts, reports and the terminal.
//!
//! Date functions are generic over the time zone: callers pass a
//! `DateTime<Local>` for display, tests pass a fixed offset.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

use crate::money::Money;

// =============================================================================
// Currency
// =============================================================================

/// Symbol plus number of decimal places, e.g. `$` with 2 → `$10.99`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    symbol: String,
    decimal_places: u8,
}

impl CurrencyFormat {
    pub fn new(symbol: &str, decimal_places: u8) -> Self {
        CurrencyFormat {
            symbol: symbol.to_string(),
            decimal_places,
        }
    }

    /// Formats an amount held in cents.
    ///
    /// Fewer than two decimal places round half up; more pad with zeros.
    ///
    /// ```rust
    /// use tally_core::format::CurrencyFormat;
    /// use tally_core::Money;
    ///
    /// let usd = CurrencyFormat::new("$", 2);
    /// assert_eq!(usd.format(Money::from_cents(2200)), "$22.00");
    ///
    /// let yen = CurrencyFormat::new("¥", 0);
    /// assert_eq!(yen.format(Money::from_cents(1250)), "¥13");
    /// ```
    pub fn format(&self, amount: Money) -> String {
        format!("{}{}", self.symbol, self.number(amount))
    }

    /// The number part without the symbol.
    pub fn number(&self, amount: Money) -> String {
        let cents = amount.cents();
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();

        match self.decimal_places {
            0 => format!("{sign}{}", (abs + 50) / 100),
            1 => {
                let tenths = (abs + 5) / 10;
                format!("{sign}{}.{}", tenths / 10, tenths % 10)
            }
            places => {
                let padding = "0".repeat(places as usize - 2);
                format!("{sign}{}.{:02}{padding}", abs / 100, abs % 100)
            }
        }
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat::new("$", 2)
    }
}

/// Shorthand for one-off formatting.
pub fn format_currency(amount: Money, symbol: &str, decimal_places: u8) -> String {
    CurrencyFormat::new(symbol, decimal_places).format(amount)
}

// =============================================================================
// Dates
// =============================================================================

/// Date rendering styles used across the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// `1/5/2024`
    Short,
    /// `January 5, 2024`
    Long,
    /// `3:04:05 PM`
    Time,
    /// `1/5/2024, 3:04:05 PM`
    DateTime,
}

impl DateStyle {
    fn pattern(self) -> &'static str {
        match self {
            DateStyle::Short => "%-m/%-d/%Y",
            DateStyle::Long => "%B %-d, %Y",
            DateStyle::Time => "%-I:%M:%S %p",
            DateStyle::DateTime => "%-m/%-d/%Y, %-I:%M:%S %p",
        }
    }
}

pub fn format_date<Tz>(date: &DateTime<Tz>, style: DateStyle) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.format(style.pattern()).to_string()
}

/// `YYYY-MM-DD`, used in export file names.
pub fn file_date<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.format("%Y-%m-%d").to_string()
}
