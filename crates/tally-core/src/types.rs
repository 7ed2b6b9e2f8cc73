//! # Domain Types
//!
//! Core domain types used throughout Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (store)     │   │  id (store)     │   │  id (store)     │       │
//! │  │  sku, barcode   │   │  items[] ───────┼─► │  totalPurchases │       │
//! │  │  price_cents    │   │  total_cents    │   │  (denormalized) │       │
//! │  │  stock (qty)    │   │  payment_method │   └─────────────────┘       │
//! │  └────────┬────────┘   └─────────────────┘                             │
//! │           │ category_id                                                │
//! │  ┌────────▼────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │   │    TaxRate      │   │ PaymentMethod   │       │
//! │  │  name           │   │  bps (u32)      │   │  cash card upi  │       │
//! │  └─────────────────┘   │  1800 = 18%     │   │  other          │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every record is keyed by an integer the store assigns on insert. Records
//! built in memory carry `id = 0` until they are written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::settings::Settings;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1800 bps = 18%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage.
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

/// Renders as a bare percentage: `18`, `8.25`, `7.5`.
impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        match frac {
            0 => write!(f, "{whole}"),
            f10 if f10 % 10 == 0 => write!(f, "{whole}.{}", f10 / 10),
            _ => write!(f, "{whole}.{frac:02}"),
        }
    }
}

impl FromStr for TaxRate {
    type Err = ValidationError;

    /// Parses a percentage ("18", "8.25", "18%").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().trim_end_matches('%');
        let pct: f64 = text.parse().map_err(|_| ValidationError::InvalidFormat {
            field: "tax rate".to_string(),
            reason: format!("'{}' is not a percentage", s.trim()),
        })?;
        if !(0.0..=100.0).contains(&pct) {
            return Err(ValidationError::OutOfRange {
                field: "tax rate".to_string(),
                min: 0,
                max: 100,
            });
        }
        Ok(TaxRate::from_percentage(pct))
    }
}

// =============================================================================
// Product
// =============================================================================

/// Default low-stock threshold when a product does not set one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: Quantity = Quantity::from_units(10);

fn default_unit() -> String {
    "pcs".to_string()
}

fn default_threshold() -> Quantity {
    DEFAULT_LOW_STOCK_THRESHOLD
}

/// Blank optional text reads as `None`, the same as an empty CSV cell or an
/// empty `--email ""` on the command line.
fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Store-assigned identifier (0 before insert).
    #[serde(default)]
    pub id: i64,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, etc.).
    #[serde(default, deserialize_with = "blank_as_none")]
    pub barcode: Option<String>,

    /// Category this product is filed under.
    #[serde(default)]
    pub category_id: Option<i64>,

    #[serde(default)]
    pub description: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Cost in cents.
    #[serde(default)]
    pub cost_cents: i64,

    /// Current stock level. Never negative.
    #[ts(type = "number")]
    pub stock: Quantity,

    /// Unit of measure ("pcs", "kg", "m").
    #[serde(default = "default_unit")]
    pub unit: String,

    /// Stock at or below this level counts as low.
    #[serde(default = "default_threshold")]
    #[ts(type = "number")]
    pub low_stock_threshold: Quantity,

    /// Tax rate in basis points (1800 = 18%).
    #[serde(default)]
    pub tax_rate_bps: u32,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Stock at or below the product's own threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }

    /// Stock at or below the given threshold.
    pub fn is_at_or_below(&self, threshold: Quantity) -> bool {
        self.stock <= threshold
    }

    pub fn is_out_of_stock(&self) -> bool {
        !self.stock.is_positive()
    }

    /// Price × stock.
    pub fn inventory_value(&self) -> Money {
        self.price().multiply_quantity(self.stock)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    #[serde(default)]
    pub id: i64,

    pub name: String,

    pub phone: String,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub address: Option<String>,

    #[serde(default)]
    pub notes: String,

    /// Running sum of sale totals. Maintained at each checkout, never recomputed.
    #[serde(default)]
    pub total_purchases_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    #[inline]
    pub fn total_purchases(&self) -> Money {
        Money::from_cents(self.total_purchases_cents)
    }
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    #[serde(default)]
    pub id: i64,
    pub name: String,
}

/// Categories seeded into an empty store.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "General",
    "Electronics",
    "Clothing",
    "Food & Beverages",
    "Books",
    "Hardware",
    "Pharmacy",
    "Cosmetics",
];

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    Other,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Upi,
        PaymentMethod::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.to_string()).collect(),
            })
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    #[serde(default)]
    pub id: i64,

    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    #[serde(default)]
    pub customer_id: Option<i64>,

    /// Line snapshots, in cart order.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<SaleItem>,

    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
}

impl Sale {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Sum of line quantities.
    pub fn items_sold(&self) -> Quantity {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleItem {
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub name: String,
    /// Unit price in cents at time of sale (frozen).
    pub price_cents: i64,
    #[ts(type = "number")]
    pub quantity: Quantity,
    /// Tax rate at time of sale (frozen).
    pub tax_rate_bps: u32,
}

impl SaleItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Price × quantity, before tax.
    pub fn line_total(&self) -> Money {
        self.price().multiply_quantity(self.quantity)
    }

    /// Tax on this line.
    pub fn tax(&self) -> Money {
        self.line_total().calculate_tax(self.tax_rate())
    }
}

// =============================================================================
// Receipt Template Metadata
// =============================================================================

/// Catalog row describing one built-in receipt template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptTemplateMeta {
    pub id: i64,
    pub name: String,
    pub key: String,
}

// =============================================================================
// Data Kinds & Backup
// =============================================================================

/// The four primary collections that can be exported, imported and restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Products,
    Customers,
    Sales,
    Categories,
}

impl DataKind {
    pub const ALL: [DataKind; 4] = [
        DataKind::Products,
        DataKind::Customers,
        DataKind::Sales,
        DataKind::Categories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Products => "products",
            DataKind::Customers => "customers",
            DataKind::Sales => "sales",
            DataKind::Categories => "categories",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DataKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "data type".to_string(),
                allowed: DataKind::ALL.iter().map(|k| k.to_string()).collect(),
            })
    }
}

/// Backup format version written into every backup file.
pub const BACKUP_VERSION: &str = "1.0.0";

/// The settings record as it sits in its collection, with its key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SettingsRecord {
    pub key: String,
    #[serde(flatten)]
    pub settings: Settings,
}

/// A full backup of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Backup {
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    pub sales: Vec<Sale>,
    pub categories: Vec<Category>,
    #[serde(default)]
    pub settings: Vec<SettingsRecord>,
    #[ts(as = "String")]
    pub export_date: DateTime<Utc>,
    pub version: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(18.0).bps(), 1800);
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
    }

    #[test]
    fn test_tax_rate_display_and_parse() {
        assert_eq!(TaxRate::from_bps(1800).to_string(), "18");
        assert_eq!(TaxRate::from_bps(825).to_string(), "8.25");
        assert_eq!(TaxRate::from_bps(750).to_string(), "7.5");
        assert_eq!("18%".parse::<TaxRate>().unwrap().bps(), 1800);
        assert!("150".parse::<TaxRate>().is_err());
        assert!("abc".parse::<TaxRate>().is_err());
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("CASH".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("upi".parse::<PaymentMethod>().unwrap(), PaymentMethod::Upi);
        assert!("cheque".parse::<PaymentMethod>().is_err());
        assert_eq!(serde_json::to_string(&PaymentMethod::Card).unwrap(), "\"card\"");
    }

    #[test]
    fn test_sale_item_math() {
        let item = SaleItem {
            product_id: 1,
            name: "Widget".to_string(),
            price_cents: 1000,
            quantity: Quantity::from_units(2),
            tax_rate_bps: 1000,
        };
        assert_eq!(item.line_total().cents(), 2000);
        assert_eq!(item.tax().cents(), 200);
    }

    #[test]
    fn test_data_kind_parse() {
        assert_eq!("Products".parse::<DataKind>().unwrap(), DataKind::Products);
        assert!("orders".parse::<DataKind>().is_err());
    }
}
