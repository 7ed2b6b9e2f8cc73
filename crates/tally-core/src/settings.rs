//! # Store Settings
//!
//! The single settings record, stored under [`SETTINGS_KEY`].
//!
//! Every field has a default so that records written by older versions (or
//! hand-edited backups) still deserialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::format::CurrencyFormat;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::receipt::ReceiptTemplate;
use crate::types::{TaxRate, DEFAULT_LOW_STOCK_THRESHOLD};
use crate::validation::{validate_decimal_places, validate_email, ValidationResult};

/// Key of the settings record in its collection.
pub const SETTINGS_KEY: &str = "appSettings";

// =============================================================================
// Theme
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(ValidationError::NotAllowed {
                field: "theme".to_string(),
                allowed: vec!["light".to_string(), "dark".to_string()],
            }),
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Store-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct Settings {
    pub store_name: String,
    pub store_address: String,
    pub store_phone: String,
    pub store_email: String,
    pub store_logo: String,

    pub currency_symbol: String,
    pub currency_code: String,
    pub decimal_places: u8,

    pub tax_enabled: bool,
    pub tax_name: String,
    /// Store tax rate in basis points (informational; products carry their own rate).
    pub tax_rate_bps: u32,

    pub receipt_header: String,
    pub receipt_footer: String,
    pub default_receipt_template: ReceiptTemplate,

    /// Global threshold used by the dashboard's low-stock list.
    #[ts(type = "number")]
    pub low_stock_threshold: Quantity,
    pub theme: Theme,
    pub language: String,

    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            store_name: "My Store".to_string(),
            store_address: String::new(),
            store_phone: String::new(),
            store_email: String::new(),
            store_logo: String::new(),
            currency_symbol: "$".to_string(),
            currency_code: "USD".to_string(),
            decimal_places: 2,
            tax_enabled: true,
            tax_name: "GST".to_string(),
            tax_rate_bps: 1800,
            receipt_header: String::new(),
            receipt_footer: "Thank you for your business!".to_string(),
            default_receipt_template: ReceiptTemplate::Thermal80Standard,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            theme: Theme::Light,
            language: "en".to_string(),
            updated_at: None,
        }
    }
}

impl Settings {
    /// Currency formatter built from the symbol and decimal places.
    pub fn currency(&self) -> CurrencyFormat {
        CurrencyFormat::new(&self.currency_symbol, self.decimal_places)
    }

    /// Formats an amount with the store's currency settings.
    pub fn format_money(&self, amount: Money) -> String {
        self.currency().format(amount)
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Checks the fields an operator can type in.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.store_name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "store name".to_string(),
            });
        }
        if !self.store_email.trim().is_empty() {
            validate_email(&self.store_email)?;
        }
        if self.currency_symbol.is_empty() {
            return Err(ValidationError::Required {
                field: "currency symbol".to_string(),
            });
        }
        validate_decimal_places(self.decimal_places)?;
        if self.tax_rate_bps > 10_000 {
            return Err(ValidationError::OutOfRange {
                field: "tax rate".to_string(),
                min: 0,
                max: 100,
            });
        }
        if self.low_stock_threshold.is_negative() {
            return Err(ValidationError::OutOfRange {
                field: "low stock threshold".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
        Ok(())
    }
}
