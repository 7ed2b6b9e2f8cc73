//! # Validation Module
//!
//! Input validation for records an operator creates or edits.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Argument parsing (clap)                                      │
//! │  ├── Type validation (numbers, enums)                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, formats, ranges                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Stock re-check inside the checkout transaction                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bulk imports and restores skip this layer and only check record shape.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::quantity::{Quantity, MAX_QUANTITY_UNITS};
use crate::types::{Customer, Product};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Highest unit price or cost an operator may enter: 1,000,000,000.00.
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000;

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
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

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ```rust
/// use tally_core::validation::validate_sku;
///
/// assert!(validate_sku("PRD-LQ3K9X-4F2A").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    required("sku", sku, 50)?;

    if !sku
        .trim()
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product, customer or category name (1-200 characters).
pub fn validate_name(name: &str) -> ValidationResult<()> {
    required("name", name, 200)
}

/// Validates a search query.
///
/// Can be empty (matches everything). Returns the trimmed query.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates an email address: `local@domain.tld`, no whitespace.
///
/// ```rust
/// use tally_core::validation::validate_email;
///
/// assert!(validate_email("ana@example.com").is_ok());
/// assert!(validate_email("ana@example").is_err());
/// assert!(validate_email("ana @example.com").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let has_inner_dot = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i < domain.len() - 1);
    if !has_inner_dot {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Digits, spaces, `-`, `+`, `(`, `)` only
/// - At least 10 digits
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '+' | '(' | ')'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "may only contain digits, spaces, and + - ( )".to_string(),
        });
    }

    if phone.chars().filter(char::is_ascii_digit).count() < 10 {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain at least 10 digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents. Zero is allowed (free items).
///
/// ```rust
/// use tally_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// assert!(validate_price_cents(i64::MAX).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    validate_amount("price", cents)
}

fn validate_amount(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS / 100,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax rate".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Stock levels and thresholds lie in `0..=MAX_QUANTITY_UNITS`.
pub fn validate_stock_level(field: &str, qty: Quantity) -> ValidationResult<()> {
    if qty.is_negative() || !qty.is_in_range() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_QUANTITY_UNITS,
        });
    }

    Ok(())
}

/// A manual stock adjustment must change something and stay within
/// ±`MAX_QUANTITY_UNITS`. The resulting level is checked by the store.
pub fn validate_stock_adjustment(delta: Quantity) -> ValidationResult<()> {
    if delta.is_zero() {
        return Err(ValidationError::NonZero {
            field: "adjustment".to_string(),
        });
    }
    if !delta.is_in_range() {
        return Err(ValidationError::OutOfRange {
            field: "adjustment".to_string(),
            min: -MAX_QUANTITY_UNITS,
            max: MAX_QUANTITY_UNITS,
        });
    }

    Ok(())
}

/// Currency decimal places (0-4).
pub fn validate_decimal_places(places: u8) -> ValidationResult<()> {
    if places > 4 {
        return Err(ValidationError::OutOfRange {
            field: "decimal places".to_string(),
            min: 0,
            max: 4,
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a product before create/update.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_name(&product.name)?;
    validate_sku(&product.sku)?;
    validate_price_cents(product.price_cents)?;
    validate_amount("cost", product.cost_cents)?;
    validate_stock_level("stock", product.stock)?;
    validate_stock_level("low stock threshold", product.low_stock_threshold)?;
    validate_tax_rate_bps(product.tax_rate_bps)?;
    required("unit", &product.unit, 20)?;
    Ok(())
}

/// Validates a customer before create/update.
pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    validate_name(&customer.name)?;
    validate_phone(&customer.phone)?;
    if let Some(email) = customer.email.as_deref() {
        validate_email(email)?;
    }
    Ok(())
}

// =============================================================================
// Generators
// =============================================================================

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Generates a SKU: `{prefix}-{base36 timestamp}-{4 random chars}`.
///
/// ```rust
/// use chrono::Utc;
/// use tally_core::validation::{generate_sku, validate_sku};
///
/// let sku = generate_sku("PRD", Utc::now());
/// assert!(sku.starts_with("PRD-"));
/// assert!(validate_sku(&sku).is_ok());
/// ```
pub fn generate_sku(prefix: &str, now: DateTime<Utc>) -> String {
    let stamp = to_base36(now.timestamp_millis().max(0) as u128);
    let random = to_base36(Uuid::new_v4().as_u128());
    let suffix: String = random.chars().rev().take(4).collect();
    format!("{prefix}-{stamp}-{suffix}")
}

// =============================================================================
// Unit Tests
// =============================================================================
