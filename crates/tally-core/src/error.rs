//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Cart, checkout, receipt, import failures       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Terminal errors (in app)                                              │
//! │  └── ApiError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                   │
//! │                          DbError ───┴─► ApiError → terminal            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::checkout::CheckoutPhase;
use crate::quantity::Quantity;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Messages are operator-facing; the terminal prints them as warnings.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not resolve to a product.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Product has no stock left to add to the cart.
    #[error("Product out of stock: {name}")]
    OutOfStock { name: String },

    /// Adding one more unit would exceed the product's live stock.
    #[error("Cannot add more than available stock ({available} {name})")]
    StockLimit { name: String, available: Quantity },

    /// Requested line quantity is above the stock captured when the line was added.
    #[error("Cannot exceed available stock ({available} {name})")]
    ExceedsStock { name: String, available: Quantity },

    /// Not enough stock to complete the operation.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: Quantity,
        requested: Quantity,
    },

    /// A line total or the sale total does not fit in a money amount.
    #[error("Amount too large: {0}")]
    AmountTooLarge(String),

    /// Cart line index is out of range.
    #[error("Cart has no line {0}")]
    LineNotFound(usize),

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A checkout attempt moved between phases in an illegal order.
    #[error("Checkout cannot move from {from:?} to {to:?}")]
    InvalidCheckoutTransition {
        from: CheckoutPhase,
        to: CheckoutPhase,
    },

    /// Receipt template key is not one of the built-in templates.
    #[error("Unknown receipt template: {0}")]
    UnknownTemplate(String),

    /// Export requested for an empty collection.
    #[error("No data to export")]
    NothingToExport,

    /// Imported file does not have the expected shape.
    #[error("Invalid import file: {0}")]
    InvalidImport(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before anything is written.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be non-zero.
    #[error("{field} must not be zero")]
    NonZero { field: String },

    /// Invalid format (e.g., malformed email, bad number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Rice".to_string(),
            available: Quantity::from_units(3),
            requested: Quantity::from_milli(5500),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Rice: available 3, requested 5.5"
        );
        assert_eq!(CoreError::EmptyCart.to_string(), "Cart is empty");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::NonZero {
            field: "adjustment".to_string(),
        };
        assert_eq!(err.to_string(), "adjustment must not be zero");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
