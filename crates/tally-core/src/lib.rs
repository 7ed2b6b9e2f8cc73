//! # tally-core: Pure Business Logic for Tally POS
//!
//! This crate holds every rule of the point of sale as plain functions with
//! zero I/O. The database and terminal crates call into it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Terminal (apps/terminal)                     │   │
//! │  │    router ──► commands::{pos, products, reports, ...} ──► view │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  receipt  │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │ templates │  │   │
//! │  │   │   Sale    │  │ Quantity  │  │ checkout  │  │  (HTML)   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  report   │  │  export   │  │  search   │  │ validation│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS IN LOGIC               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, Customer, Sale, Category, Backup)
//! - [`money`] / [`quantity`] - Integer money and fixed-point quantities
//! - [`cart`] / [`checkout`] - Session cart and the checkout attempt lifecycle
//! - [`receipt`] - The seven built-in receipt templates
//! - [`report`] - Date windows and report aggregates
//! - [`export`] - CSV / JSON encoding and backup documents
//! - [`search`] - In-memory search and sort
//! - [`settings`] / [`format`] - Store settings and display formatting
//! - [`validation`] / [`error`] - Input rules and error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::types::TaxRate;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let tax = price.calculate_tax(TaxRate::from_bps(825)); // 8.25%
//! assert_eq!(tax.cents(), 91);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod export;
pub mod format;
pub mod money;
pub mod quantity;
pub mod receipt;
pub mod report;
pub mod search;
pub mod settings;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals};
pub use checkout::{CheckoutAttempt, CheckoutPhase};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use quantity::{Quantity, MAX_QUANTITY_UNITS};
pub use receipt::ReceiptTemplate;
pub use report::DateRange;
pub use settings::{Settings, Theme, SETTINGS_KEY};
pub use types::*;
