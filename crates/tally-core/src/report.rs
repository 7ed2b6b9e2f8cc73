//! # Reports
//!
//! Read-only aggregates over sales, products and customers.
//!
//! ## Date Windows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  today      local midnight ─────────────────────────────────► now     │
//! │  yesterday  midnight - 1 day ──► 23:59:59.999 of that day               │
//! │  week       now - 7 days ───────────────────────────────────► now     │
//! │  month      now - 1 month ──────────────────────────────────► now     │
//! │  year       now - 1 year ───────────────────────────────────► now     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the day windows are calendar-aligned. Both ends are inclusive.
//! Every function takes `now` so windows are computed in the caller's zone.

use chrono::{DateTime, Duration, Months, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::search::{sort_by, SortOrder};
use crate::types::{Customer, Product, Sale, DEFAULT_LOW_STOCK_THRESHOLD};

/// Number of customers in the top-customers list.
pub const TOP_CUSTOMERS: usize = 10;

/// Number of sales on the dashboard.
pub const RECENT_SALES: usize = 5;

// =============================================================================
// Date Range
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    Today,
    Yesterday,
    Week,
    Month,
    Year,
}

impl DateRange {
    pub const ALL: [DateRange; 5] = [
        DateRange::Today,
        DateRange::Yesterday,
        DateRange::Week,
        DateRange::Month,
        DateRange::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::Today => "today",
            DateRange::Yesterday => "yesterday",
            DateRange::Week => "week",
            DateRange::Month => "month",
            DateRange::Year => "year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateRange::Today => "Today",
            DateRange::Yesterday => "Yesterday",
            DateRange::Week => "This Week",
            DateRange::Month => "This Month",
            DateRange::Year => "This Year",
        }
    }

    /// Inclusive `(start, end)` of the window ending at `now`.
    pub fn bounds<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
        let end = now.with_timezone(&Utc);
        match self {
            DateRange::Today => (start_of_day(now), end),
            DateRange::Yesterday => {
                let today = start_of_day(now);
                let start = start_of_day(&(now.clone() - Duration::days(1)));
                (start, today - Duration::milliseconds(1))
            }
            DateRange::Week => (end - Duration::days(7), end),
            DateRange::Month => (sub_months(now, 1), end),
            DateRange::Year => (sub_months(now, 12), end),
        }
    }

    pub fn contains<Tz: TimeZone>(&self, date: &DateTime<Utc>, now: &DateTime<Tz>) -> bool {
        let (start, end) = self.bounds(now);
        *date >= start && *date <= end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DateRange::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "range".to_string(),
                allowed: DateRange::ALL.iter().map(|r| r.to_string()).collect(),
            })
    }
}

/// Local midnight of `now`'s calendar day, in UTC.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match now.timezone().from_local_datetime(&midnight).earliest() {
        Some(start) => start.with_timezone(&Utc),
        // Midnight skipped by a DST jump: step back by the elapsed wall time.
        None => now.with_timezone(&Utc) - (now.naive_local() - midnight),
    }
}

fn sub_months<Tz: TimeZone>(now: &DateTime<Tz>, months: u32) -> DateTime<Utc> {
    now.clone()
        .checked_sub_months(Months::new(months))
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|| now.with_timezone(&Utc) - Duration::days(30 * months as i64))
}

/// Sales inside the window, in input order.
pub fn sales_in_range<'a, Tz: TimeZone>(
    sales: &'a [Sale],
    range: DateRange,
    now: &DateTime<Tz>,
) -> Vec<&'a Sale> {
    let (start, end) = range.bounds(now);
    sales
        .iter()
        .filter(|s| s.date >= start && s.date <= end)
        .collect()
}

// =============================================================================
// Sales
// =============================================================================

/// Headline numbers for a set of sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SalesStats {
    pub revenue: Money,
    pub transactions: usize,
    pub items_sold: Quantity,
    pub average_transaction: Money,
}

impl SalesStats {
    pub fn from_sales<'a>(sales: impl IntoIterator<Item = &'a Sale>) -> Self {
        let mut stats = SalesStats::default();
        for sale in sales {
            stats.revenue += sale.total();
            stats.transactions += 1;
            stats.items_sold += sale.items_sold();
        }
        if stats.transactions > 0 {
            let n = stats.transactions as i64;
            let cents = stats.revenue.cents();
            let rounded = (cents.abs() + n / 2) / n;
            stats.average_transaction = Money::from_cents(if cents < 0 { -rounded } else { rounded });
        }
        stats
    }
}

/// Sales in a window, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesReport {
    pub range: DateRange,
    pub stats: SalesStats,
    pub sales: Vec<Sale>,
}

pub fn sales_report<Tz: TimeZone>(sales: &[Sale], range: DateRange, now: &DateTime<Tz>) -> SalesReport {
    let mut selected: Vec<Sale> = sales_in_range(sales, range, now)
        .into_iter()
        .cloned()
        .collect();
    sort_by(&mut selected, |s| s.date, SortOrder::Descending);

    SalesReport {
        range,
        stats: SalesStats::from_sales(&selected),
        sales: selected,
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// A threshold of zero counts as unset.
pub fn effective_threshold(threshold: Quantity) -> Quantity {
    if threshold.is_zero() {
        DEFAULT_LOW_STOCK_THRESHOLD
    } else {
        threshold
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryReport {
    pub total_products: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub inventory_value: Money,
    pub products: Vec<Product>,
}

pub fn inventory_report(products: &[Product]) -> InventoryReport {
    InventoryReport {
        total_products: products.len(),
        low_stock: products
            .iter()
            .filter(|p| p.is_at_or_below(effective_threshold(p.low_stock_threshold)))
            .count(),
        out_of_stock: products.iter().filter(|p| p.stock.is_zero()).count(),
        inventory_value: products.iter().map(Product::inventory_value).sum(),
        products: products.to_vec(),
    }
}

// =============================================================================
// Customers
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerReport {
    pub total_customers: usize,
    pub total_revenue: Money,
    /// Up to ten customers with purchases, highest first.
    pub top_customers: Vec<Customer>,
}

pub fn customer_report(customers: &[Customer]) -> CustomerReport {
    let mut top: Vec<Customer> = customers
        .iter()
        .filter(|c| c.total_purchases_cents > 0)
        .cloned()
        .collect();
    sort_by(&mut top, |c| c.total_purchases_cents, SortOrder::Descending);
    top.truncate(TOP_CUSTOMERS);

    CustomerReport {
        total_customers: customers.len(),
        total_revenue: customers.iter().map(Customer::total_purchases).sum(),
        top_customers: top,
    }
}

// =============================================================================
// Tax
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TaxReport {
    pub range: DateRange,
    pub total_tax: Money,
    pub total_sales: Money,
    pub sales: Vec<Sale>,
}

pub fn tax_report<Tz: TimeZone>(sales: &[Sale], range: DateRange, now: &DateTime<Tz>) -> TaxReport {
    let selected: Vec<Sale> = sales_in_range(sales, range, now)
        .into_iter()
        .cloned()
        .collect();

    TaxReport {
        range,
        total_tax: selected.iter().map(Sale::tax).sum(),
        total_sales: selected.iter().map(Sale::total).sum(),
        sales: selected,
    }
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub today_total: Money,
    pub product_count: usize,
    pub customer_count: usize,
    pub transaction_count: usize,
    pub recent_sales: Vec<Sale>,
    pub low_stock: Vec<Product>,
}

/// `low_stock_threshold` is the store-wide setting.
pub fn dashboard<Tz: TimeZone>(
    products: &[Product],
    customers: &[Customer],
    sales: &[Sale],
    low_stock_threshold: Quantity,
    now: &DateTime<Tz>,
) -> Dashboard {
    let midnight = start_of_day(now);

    let mut recent = sales.to_vec();
    sort_by(&mut recent, |s| s.date, SortOrder::Descending);
    recent.truncate(RECENT_SALES);

    let threshold = effective_threshold(low_stock_threshold);

    Dashboard {
        today_total: sales
            .iter()
            .filter(|s| s.date >= midnight)
            .map(Sale::total)
            .sum(),
        product_count: products.len(),
        customer_count: customers.len(),
        transaction_count: sales.len(),
        recent_sales: recent,
        low_stock: products
            .iter()
            .filter(|p| p.is_at_or_below(threshold))
            .cloned()
            .collect(),
    }
}

// =============================================================================
// Export
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Sales,
    Inventory,
    Customers,
    Tax,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::Sales,
        ReportKind::Inventory,
        ReportKind::Customers,
        ReportKind::Tax,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Sales => "sales",
            ReportKind::Inventory => "inventory",
            ReportKind::Customers => "customers",
            ReportKind::Tax => "tax",
        }
    }

    /// Whether the report depends on a date window.
    pub fn is_ranged(&self) -> bool {
        matches!(self, ReportKind::Sales | ReportKind::Tax)
    }

    /// CSV file name for the report, e.g. `sales_report_week_2024-01-05.csv`.
    pub fn filename(&self, range: DateRange, date: &str) -> String {
        match self {
            ReportKind::Sales => format!("sales_report_{range}_{date}.csv"),
            ReportKind::Inventory => format!("inventory_report_{date}.csv"),
            ReportKind::Customers => format!("customer_report_{date}.csv"),
            ReportKind::Tax => format!("tax_report_{range}_{date}.csv"),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ReportKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "report".to_string(),
                allowed: ReportKind::ALL.iter().map(|k| k.to_string()).collect(),
            })
    }
}
